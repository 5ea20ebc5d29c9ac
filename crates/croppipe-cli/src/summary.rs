use std::path::PathBuf;

use console::Style;
use croppipe_core::error::ImageLoadError;
use croppipe_core::pipeline::StageState;
use croppipe_core::workspace::Workspace;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    disabled: Style,
    error: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            disabled: Style::new().dim().yellow(),
            error: Style::new().red(),
            path: Style::new().underlined(),
        }
    }

    /// Terminal approximation of the list status colour.
    fn state(&self, state: StageState) -> Style {
        match state {
            StageState::None => Style::new().white(),
            StageState::Cropped => Style::new().yellow(),
            StageState::Resized => Style::new().blue(),
            StageState::Inferred => Style::new().green(),
            StageState::Fixed => Style::new().red(),
        }
    }
}

pub fn print_workspace_summary(workspace: &Workspace, duplicates: usize) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Workspace"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Images"),
        s.value.apply_to(workspace.len())
    );
    if duplicates > 0 {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Duplicates"),
            s.disabled.apply_to(format!("{duplicates} skipped"))
        );
    }
    println!();

    if workspace.is_empty() {
        return;
    }

    println!("  {}", s.header.apply_to("Images"));
    for (i, record) in workspace.iter().enumerate() {
        let pipeline = record.pipeline();
        let roi = pipeline
            .roi()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let resize = pipeline
            .resize_spec()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "    {}  {}  {:<24} {:>11}  {:<24} {:<11}",
            s.label.apply_to(Workspace::label(i)),
            s.state(pipeline.state()).apply_to(pipeline.state()),
            record.file_name(),
            format!("{}x{}", record.width(), record.height()),
            roi,
            resize
        );
    }
    println!();
}

pub fn print_failures(failures: &[ImageLoadError]) {
    if failures.is_empty() {
        return;
    }
    let s = Styles::new();

    println!("  {}", s.header.apply_to("Failed to load"));
    for failure in failures {
        println!(
            "    {}  {}",
            s.path.apply_to(failure.path().display()),
            s.error.apply_to(failure)
        );
    }
    println!();
}

pub fn print_crop_summary(saved: &[PathBuf]) {
    let s = Styles::new();

    if saved.is_empty() {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Saved"),
            s.disabled.apply_to("nothing")
        );
        return;
    }
    println!("  {}", s.header.apply_to("Saved"));
    for path in saved {
        println!("    {}", s.path.apply_to(path.display()));
    }
    println!();
}
