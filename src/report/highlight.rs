use comfy_table::Color;

/// Colour band of a coverage percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// >= 90
    Complete,
    /// 70 < v < 90
    Partial,
    /// 60 < v <= 70
    Weak,
    /// <= 60
    Poor,
}

impl Highlight {
    pub fn for_value(value: f64) -> Self {
        if value >= 90.0 {
            Highlight::Complete
        } else if value <= 60.0 {
            Highlight::Poor
        } else if value <= 70.0 {
            Highlight::Weak
        } else {
            Highlight::Partial
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            Highlight::Complete => "#6aa84f",
            Highlight::Partial => "#cfe2f3",
            Highlight::Weak => "#ffe599",
            Highlight::Poor => "#f4cccc",
        }
    }

    pub fn color(&self) -> Color {
        let hex = self.hex().trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0xff);
        Color::Rgb {
            r: channel(0),
            g: channel(2),
            b: channel(4),
        }
    }
}

/// Band for a table cell; cells that are not numbers get none
pub fn highlight(cell: &str) -> Option<Highlight> {
    cell.trim().parse::<f64>().ok().map(Highlight::for_value)
}
