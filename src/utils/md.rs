use std::io::IsTerminal;

use polars::prelude::*;

pub fn print_md(s: impl AsRef<str>) {
    let mut printer = MarkdownPrinter::new();
    printer.add(s);
    printer.dump();
}

/// Accumulates markdown and renders it styled when stdout is a terminal,
/// plain otherwise.
pub struct MarkdownPrinter {
    content: String,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownPrinter {
    pub fn new() -> Self {
        Self {
            content: String::new(),
        }
    }

    fn is_tty(&self) -> bool {
        std::io::stdout().is_terminal()
    }

    pub fn dump(&self) {
        if self.is_tty() {
            let mut skin = termimad::MadSkin::default();
            for i in 0..8 {
                skin.headers[i].align = termimad::Alignment::Left;
                skin.headers[i].add_attr(termimad::crossterm::style::Attribute::Bold);
                skin.headers[i].set_fg(termimad::crossterm::style::Color::Blue);
            }
            skin.headers[0].set_bg(termimad::crossterm::style::Color::Blue);
            skin.headers[0].add_attr(termimad::crossterm::style::Attribute::NoUnderline);
            skin.print_text(&self.content);
        } else {
            println!("{}", self.content);
        }
    }

    pub fn add(&mut self, s: impl AsRef<str>) {
        self.content.push_str(s.as_ref());
    }

    /// Append a dataframe as a markdown table.
    pub fn add_dataframe(&mut self, df: &DataFrame) {
        let columns = df.get_columns();
        let header: Vec<&str> = columns.iter().map(|c| c.name()).collect();
        self.add(format!("| {} |\n", header.join(" | ")));
        self.add(format!("|{}\n", "---|".repeat(header.len())));
        for row in 0..df.height() {
            let cells: Vec<String> = columns
                .iter()
                .map(|c| match c.get(row) {
                    Ok(AnyValue::Null) => String::new(),
                    Ok(AnyValue::Float64(v)) => format!("{v:.4e}"),
                    Ok(AnyValue::String(s)) => s.to_owned(),
                    Ok(other) => other.to_string(),
                    Err(_) => String::new(),
                })
                .collect();
            self.add(format!("| {} |\n", cells.join(" | ")));
        }
    }
}

#[macro_export]
macro_rules! print_md {
    ($($arg:tt)*) => {
        $crate::utils::md::print_md(format!($($arg)*));
    };
}
