use console::{measure_text_width, Style};

use crate::item::Item;
use crate::scoring::{ClosetGrade, ClosetReport, ValuationBreakdown};

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 25;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

fn tree_connector(index: usize, count: usize) -> String {
    if index + 1 == count {
        tree_end()
    } else {
        tree_branch()
    }
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn init_prefix() -> String {
    blue().apply_to("[INIT]").to_string()
}

fn store_prefix() -> String {
    magenta().apply_to("[STORE]").to_string()
}

fn score_prefix() -> String {
    yellow().apply_to("[SCORE]").to_string()
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

pub fn format_signed(value: i32) -> String {
    let sign = if value >= 0 { "+" } else { "-" };
    format!("{}{}", dim().apply_to(sign), value.unsigned_abs())
}

fn grade_style(grade: ClosetGrade) -> Style {
    match grade {
        ClosetGrade::Excellent | ClosetGrade::Good => green().bold(),
        ClosetGrade::Fair => yellow().bold(),
        ClosetGrade::Poor => red().bold(),
    }
}

fn valuation_style(valuation: i32) -> Style {
    if valuation >= i32::from(ClosetGrade::GOOD_THRESHOLD) {
        green()
    } else if valuation >= i32::from(ClosetGrade::FAIR_THRESHOLD) {
        yellow()
    } else {
        red()
    }
}

pub fn log_startup(database_url: &str, watch_enabled: bool) {
    println!(
        "{} opening closet at {}...",
        init_prefix(),
        cyan().apply_to(database_url),
    );
    println!(
        "{} database watch is {}.",
        init_prefix(),
        if watch_enabled {
            green().apply_to("enabled")
        } else {
            yellow().apply_to("disabled")
        }
    );
}

pub fn log_store_ready(item_count: usize) {
    println!(
        "{} ready with {} items",
        store_prefix(),
        bold().apply_to(item_count)
    );
}

pub fn log_store_error(error: &str) {
    println!(
        "{} {} {}",
        store_prefix(),
        red().apply_to("error:"),
        dim().apply_to(error)
    );
}

pub fn log_watching(path: &str) {
    println!(
        "{} watching {} for outside changes",
        store_prefix(),
        cyan().apply_to(path)
    );
}

pub fn log_shutdown() {
    println!("{} shutting down.", init_prefix());
}

pub fn report_lines(report: &ClosetReport, top_items: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let stats = &report.statistics;

    lines.push(format!(
        "{} {} {}",
        score_prefix(),
        bold().apply_to(format!("{}/100", report.score)),
        grade_style(report.grade).apply_to(report.grade)
    ));

    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("items", 1),
        bold().apply_to(stats.item_count)
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("total wears", 1),
        bold().apply_to(stats.total_wears)
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("thrifted", 1),
        cyan().apply_to(format!("{:.1}%", stats.thrift_percentage))
    ));

    let weakest = report.weakest(top_items);
    let average = format!("{:.2}", stats.average_price);
    if weakest.is_empty() {
        lines.push(format!(
            "{}{} {}",
            tree_end(),
            pad_label("average price", 1),
            average
        ));
        return lines;
    }

    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("average price", 1),
        average
    ));
    lines.push(format!("{}{}", tree_end(), pad_label("weakest items", 1)));
    for (i, contribution) in weakest.iter().enumerate() {
        let label = if contribution.status.is_gone() {
            format!("{} ({})", contribution.name, contribution.status)
        } else {
            contribution.name.clone()
        };
        lines.push(format!(
            "    {}{} {}",
            tree_connector(i, weakest.len()),
            pad_label(&label, 2),
            valuation_style(contribution.valuation).apply_to(format_signed(contribution.valuation))
        ));
    }

    lines
}

pub fn log_report(report: &ClosetReport, top_items: usize) {
    println!("{}\n", report_lines(report, top_items).join("\n"));
}

fn push_reasons(lines: &mut Vec<String>, label: &str, reasons: &[String], last: bool) {
    let (head, indent) = if last {
        (tree_end(), "    ".to_string())
    } else {
        (tree_branch(), tree_indent())
    };
    lines.push(format!("{}{}", head, pad_label(label, 1)));
    if reasons.is_empty() {
        lines.push(format!("{}{}{}", indent, tree_end(), dim().apply_to("none")));
        return;
    }
    for (i, reason) in reasons.iter().enumerate() {
        lines.push(format!(
            "{}{}{}",
            indent,
            tree_connector(i, reasons.len()),
            reason
        ));
    }
}

pub fn valuation_lines(item: &Item, breakdown: &ValuationBreakdown) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "{} {}",
        magenta().apply_to(bold().apply_to("[ITEM VALUATION]")),
        dim().apply_to(format!(
            "{} / {} / {} / {} wears / {:.2}{}",
            item.brand_type,
            item.material,
            item.status,
            item.wear_count,
            item.price,
            if item.is_second_hand {
                " / second-hand"
            } else {
                ""
            }
        ))
    ));

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("TERMS")));
    let terms = [
        ("base", breakdown.base),
        ("second-hand", breakdown.second_hand),
        ("brand", breakdown.brand),
        ("material", breakdown.material),
        ("wear", breakdown.wear),
        ("status", breakdown.status),
    ];
    for (i, (label, value)) in terms.iter().enumerate() {
        lines.push(format!(
            "{}{} {}",
            tree_connector(i, terms.len()),
            pad_label(label, 1),
            format_signed(*value)
        ));
    }

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("REASONS")));
    push_reasons(&mut lines, "boosts", &breakdown.boost_reasons, false);
    push_reasons(&mut lines, "penalties", &breakdown.penalty_reasons, true);

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("RESULT")));
    lines.push(format!(
        "{}{} {}",
        tree_end(),
        pad_label("valuation", 1),
        valuation_style(breakdown.total).apply_to(format_signed(breakdown.total))
    ));

    lines
}

pub fn log_valuation(item: &Item, breakdown: &ValuationBreakdown) {
    println!("{}\n", valuation_lines(item, breakdown).join("\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ClosetSnapshot, ItemStatus, StoredItem};
    use crate::scoring::explain_valuation;

    fn plain(lines: &[String]) -> String {
        console::strip_ansi_codes(&lines.join("\n")).to_string()
    }

    #[test]
    fn test_pad_label_aligns_values() {
        assert_eq!(measure_text_width(&pad_label("items", 1)), VALUE_COLUMN - 4);
        assert_eq!(measure_text_width(&pad_label("items", 2)), VALUE_COLUMN - 8);
        let long = "a".repeat(40);
        assert_eq!(pad_label(&long, 1), format!("{long} "));
    }

    #[test]
    fn test_format_signed() {
        assert_eq!(console::strip_ansi_codes(&format_signed(12)), "+12");
        assert_eq!(console::strip_ansi_codes(&format_signed(-30)), "-30");
        assert_eq!(console::strip_ansi_codes(&format_signed(0)), "+0");
    }

    #[test]
    fn test_report_lines_list_weakest_items() {
        let snapshot = ClosetSnapshot::new(vec![
            StoredItem {
                id: 1,
                name: "old trainers".into(),
                item: Item {
                    status: ItemStatus::Trashed,
                    ..Default::default()
                },
                created_at: 0,
                updated_at: 0,
            },
            StoredItem {
                id: 2,
                name: "linen shirt".into(),
                item: Item::default(),
                created_at: 0,
                updated_at: 0,
            },
        ]);
        let report = ClosetReport::evaluate(&snapshot);
        let text = plain(&report_lines(&report, 1));

        assert!(text.contains("20/100"));
        assert!(text.contains("POOR"));
        assert!(text.contains("old trainers (trashed)"));
        assert!(!text.contains("linen shirt"));
    }

    #[test]
    fn test_empty_report_lines() {
        let text = plain(&report_lines(&ClosetReport::default(), 5));
        assert!(text.contains("0/100"));
        assert!(text.contains("0.0%"));
        assert!(!text.contains("weakest items"));
    }

    #[test]
    fn test_valuation_lines() {
        let item = Item {
            is_second_hand: true,
            ..Default::default()
        };
        let text = plain(&valuation_lines(&item, &explain_valuation(&item)));

        assert!(text.contains("second-hand (+20)"));
        assert!(text.contains("mixed material (-5)"));
        assert!(text.contains("+65"));
    }
}
