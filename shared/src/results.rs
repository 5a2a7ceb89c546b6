use std::fmt::Write;
use crate::models::Poll;

const ACTIVE: &str = "🟢 (Active)";
const COMPLETED: &str = "🔴 (Completed)";

/// Share of voters that picked an option, in percent. Zero voters yields 0.
pub fn percentage(count: u32, total_voters: usize) -> f64 {
    if total_voters == 0 {
        return 0.0;
    }
    f64::from(count) / total_voters as f64 * 100.0
}

/// Renders the current tally as a markdown table followed by the question and
/// the poll status.
pub fn render_results(poll: &Poll) -> String {
    let total_voters = poll.total_voters();

    let mut rows: Vec<_> = poll.options.iter().collect();
    rows.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut table = String::from("| Options | Voices | Percent |\n|---------|--------|---------|\n");
    for (option, &count) in rows {
        // writing into a String cannot fail
        let _ = writeln!(
            table,
            "| `{}` | `{}` | `{:.1}％` |",
            option,
            count,
            percentage(count, total_voters)
        );
    }

    let status = if poll.closed { COMPLETED } else { ACTIVE };
    let _ = writeln!(table, "| *Question*: `{}` |", poll.question);
    let _ = write!(table, "| *Status:* {} |", status);

    table
}
