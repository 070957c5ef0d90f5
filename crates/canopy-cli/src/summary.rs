use std::path::Path;

use console::Style;
use canopy_core::composite::CompositeImage;
use canopy_core::detection::ThresholdConfig;
use canopy_core::pipeline::{AnalysisOutput, AnalysisRequest};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    alert: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            alert: Style::new().red().bold(),
        }
    }
}

pub fn print_request_summary(request: &AnalysisRequest, scene_dir: &Path) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Canopy Change Analysis"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(22)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Region"),
        s.value.apply_to(&request.region)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Scenes"),
        s.path.apply_to(scene_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Baseline"),
        s.value.apply_to(request.baseline)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Current"),
        s.value.apply_to(request.current)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Max cloud"),
        s.value.apply_to(format!("< {:.0}%", request.scenes.max_cloud_cover_pct))
    );
    println!();

    print_threshold_section(&s, &request.thresholds);
}

fn print_threshold_section(s: &Styles, t: &ThresholdConfig) {
    println!("  {}", s.header.apply_to("Thresholds"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Forest"),
        s.value.apply_to(format!("> {:.2}", t.forest_threshold))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Bare"),
        s.value.apply_to(format!("< {:.2}", t.bare_threshold))
    );
    match t.min_drop {
        Some(drop) => println!(
            "    {:<12}{}",
            s.label.apply_to("Min drop"),
            s.value.apply_to(format!("> {drop:.2}"))
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Min drop"),
            s.disabled.apply_to("none")
        ),
    }
    if t.erosion_radius == 0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Erosion"),
            s.disabled.apply_to("disabled")
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Erosion"),
            s.value.apply_to(format!("{} px", t.erosion_radius))
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Patches"),
        s.method.apply_to(format!(">= {} px, {}", t.min_patch_size, t.connectivity))
    );
    println!();
}

pub fn print_alert_summary(output: &AnalysisOutput) {
    let s = Styles::new();
    let summary = &output.summary;

    println!();
    println!("  {}", s.header.apply_to("Composites"));
    print_composite_line(&s, "Baseline", &output.baseline);
    print_composite_line(&s, "Current", &output.current);
    println!();

    println!("  {}", s.header.apply_to("Alerts"));
    if output.is_no_data() {
        println!(
            "    {}",
            s.disabled.apply_to("a window has no usable data; alerts are empty")
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Candidates"),
        s.value.apply_to(summary.candidate_pixels)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Alert px"),
        s.alert.apply_to(summary.alert_pixels)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Patches"),
        s.value.apply_to(summary.patch_count)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Largest"),
        s.value.apply_to(format!("{} px", summary.largest_patch_pixels))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Area"),
        s.alert.apply_to(format!("{:.2} ha", summary.alert_hectares))
    );

    if !summary.protected.is_empty() {
        println!();
        println!("  {}", s.header.apply_to("Protected Areas"));
        for overlap in &summary.protected {
            println!(
                "    {:<24}{}",
                s.label.apply_to(&overlap.name),
                s.alert.apply_to(format!(
                    "{} px ({:.2} ha)",
                    overlap.alert_pixels, overlap.hectares
                ))
            );
        }
    }
}

fn print_composite_line(s: &Styles, label: &str, image: &CompositeImage) {
    let p = &image.provenance;
    let text = format!("{} scene(s), {} dropped", p.scene_count, p.dropped_scenes);
    if image.is_no_data() {
        println!(
            "    {:<12}{}",
            s.label.apply_to(label),
            s.disabled.apply_to(format!("{text}, no data"))
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to(label),
            s.value.apply_to(text)
        );
    }
}
