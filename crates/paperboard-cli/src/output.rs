use std::io::Write;

use owo_colors::OwoColorize;
use paperboard_core::shard::ShardSummary;
use paperboard_core::view::{PaperView, VenueBadge};
use paperboard_core::{FacetCounts, LoadReport, PublicationStatus};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the month index, latest first.
pub fn print_months(w: &mut dyn Write, months: &[String], color: ColorMode) -> std::io::Result<()> {
    for (i, month) in months.iter().enumerate() {
        if i == 0 && color.enabled() {
            writeln!(w, "{} {}", month.bold(), "(latest)".dimmed())?;
        } else if i == 0 {
            writeln!(w, "{} (latest)", month)?;
        } else {
            writeln!(w, "{}", month)?;
        }
    }
    Ok(())
}

/// Warn about months that could not be loaded.
pub fn print_load_report(
    w: &mut dyn Write,
    report: &LoadReport,
    color: ColorMode,
) -> std::io::Result<()> {
    for (month, error) in &report.failed {
        if color.enabled() {
            writeln!(w, "{} {}: {}", "WARNING:".yellow(), month, error)?;
        } else {
            writeln!(w, "WARNING: {}: {}", month, error)?;
        }
    }
    Ok(())
}

/// Print one line per facet dimension with its counts.
pub fn print_facets(w: &mut dyn Write, facets: &FacetCounts, color: ColorMode) -> std::io::Result<()> {
    let rows: [(&str, Vec<String>); 4] = [
        ("Status", facets.status.iter().map(|f| format!("{} ({})", f.label(), f.count)).collect()),
        ("Category", facets.category.iter().map(|f| format!("{} ({})", f.label(), f.count)).collect()),
        ("Field", facets.field.iter().map(|f| format!("{} ({})", f.label(), f.count)).collect()),
        ("Task", facets.task.iter().map(|f| format!("{} ({})", f.label(), f.count)).collect()),
    ];
    for (name, values) in rows {
        let label = format!("{name:>9}:");
        if color.enabled() {
            writeln!(w, "{} {}", label.bold(), values.join("  ").dimmed())?;
        } else {
            writeln!(w, "{} {}", label, values.join("  "))?;
        }
    }
    writeln!(w)?;
    Ok(())
}

/// Print the result header: total results, rendered count, selection.
pub fn print_result_header(
    w: &mut dyn Write,
    total: usize,
    rendered: usize,
    filters: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    let msg = format!("{} papers (showing {}/{}) - {}", total, rendered, total, filters);
    if color.enabled() {
        writeln!(w, "{}", msg.bold())?;
    } else {
        writeln!(w, "{}", msg)?;
    }
    let sep = "=".repeat(60);
    writeln!(w, "{}", sep)?;
    Ok(())
}

/// Print a compact result card.
pub fn print_paper(w: &mut dyn Write, view: &PaperView, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", view.date.dimmed(), view.title.bold())?;
    } else {
        writeln!(w, "{} {}", view.date, view.title)?;
    }

    let status = match view.status {
        PublicationStatus::Published => "published",
        PublicationStatus::Preprint => "preprint",
    };
    let mut meta = vec![view.id.clone(), status.to_string()];
    if let Some(venue) = &view.venue {
        meta.push(venue.text.clone());
    }
    if color.enabled() {
        let venue_colored = view
            .venue
            .as_ref()
            .map(|v| format!("  {}", badge_colored(v.badge, &v.text)))
            .unwrap_or_default();
        writeln!(w, "  {} {}{}", view.id.cyan(), status.dimmed(), venue_colored)?;
    } else {
        writeln!(w, "  {}", meta.join(" | "))?;
    }
    writeln!(w, "  {}", truncate(&view.authors, 100))?;
    if !view.summary.is_empty() {
        writeln!(w, "  {}", truncate(&view.summary, 160))?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print every field of one record.
pub fn print_paper_detail(
    w: &mut dyn Write,
    view: &PaperView,
    color: ColorMode,
) -> std::io::Result<()> {
    let heading = |w: &mut dyn Write, name: &str| -> std::io::Result<()> {
        if color.enabled() {
            writeln!(w, "{}:", name.bold())
        } else {
            writeln!(w, "{}:", name)
        }
    };

    if color.enabled() {
        writeln!(w, "{}", view.title.bold().cyan())?;
    } else {
        writeln!(w, "{}", view.title)?;
    }
    writeln!(w, "{}", view.link)?;
    writeln!(w)?;

    writeln!(w, "  Published: {}", view.date)?;
    writeln!(w, "  Status:    {}", view.status)?;
    if let Some(venue) = &view.venue {
        writeln!(w, "  Venue:     {} [{}]", venue.text, venue.badge.class())?;
    }
    if let Some(category) = &view.primary_category {
        writeln!(w, "  arXiv:     {}", category)?;
    }
    if let Some(code) = &view.code_link {
        writeln!(w, "  Code:      {}", code)?;
    }
    if !view.tags.is_empty() {
        writeln!(w, "  Tags:      {}", view.tags.join(", "))?;
    }
    writeln!(w)?;

    heading(w, "Authors")?;
    writeln!(w, "  {}", view.authors)?;
    writeln!(w)?;
    if !view.summary.is_empty() {
        heading(w, "Summary")?;
        writeln!(w, "  {}", view.summary)?;
        writeln!(w)?;
    }
    heading(w, "Abstract")?;
    writeln!(w, "  {}", view.abstract_text)?;
    Ok(())
}

/// Print the footer shown when more batches remain.
pub fn print_more_hint(w: &mut dyn Write, remaining: usize, color: ColorMode) -> std::io::Result<()> {
    if remaining == 0 {
        return Ok(());
    }
    let msg = format!("... {} more (use --more to load further batches)", remaining);
    if color.enabled() {
        writeln!(w, "{}", msg.dimmed())?;
    } else {
        writeln!(w, "{}", msg)?;
    }
    Ok(())
}

pub fn print_shard_summary(
    w: &mut dyn Write,
    summary: &ShardSummary,
    out_dir: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    let msg = format!(
        "Wrote {} papers across {} months to {}",
        summary.papers, summary.months, out_dir
    );
    if color.enabled() {
        writeln!(w, "{}", msg.green())?;
    } else {
        writeln!(w, "{}", msg)?;
    }
    if summary.duplicates > 0 || summary.skipped > 0 {
        let detail = format!(
            "(Dropped {} duplicates, skipped {} unusable lines)",
            summary.duplicates, summary.skipped
        );
        if color.enabled() {
            writeln!(w, "{}", detail.dimmed())?;
        } else {
            writeln!(w, "{}", detail)?;
        }
    }
    Ok(())
}

fn badge_colored(badge: VenueBadge, text: &str) -> String {
    match badge {
        VenueBadge::Neurips | VenueBadge::Iclr | VenueBadge::Icml => text.magenta().to_string(),
        VenueBadge::Cvpr | VenueBadge::Iccv | VenueBadge::Eccv => text.blue().to_string(),
        VenueBadge::Acl | VenueBadge::Emnlp | VenueBadge::Naacl => text.yellow().to_string(),
        VenueBadge::Aaai | VenueBadge::Ijcai => text.cyan().to_string(),
        VenueBadge::Published => text.green().to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}
