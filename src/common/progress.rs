use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .expect("Failed to create progress style")
    );
    pb.set_message(message.to_string());
    pb
}

/// Counter over journals or collections, one tick per item
pub fn create_count_progress_bar(total_items: u64, unit: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_items);
    let template = format!(
        "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} {{msg}}",
        unit
    );
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&template)
            .expect("Failed to create progress style")
            .progress_chars("#>-")
    );
    pb
}
