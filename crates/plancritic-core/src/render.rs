//! Markdown rendering of a post-processed review.

use crate::review::{Evidence, Issue, Review, Severity};

pub fn render_markdown(review: &Review) -> String {
    let mut out = String::new();
    let summary = &review.summary;

    out.push_str("# PlanCritic Review\n\n");
    out.push_str(&format!("**Verdict:** {}\n", summary.verdict));
    out.push_str(&format!("**Score:** {} / 100\n", summary.score));
    out.push_str(&format!(
        "**Issues:** {} critical, {} warnings, {} info\n\n",
        summary.critical_count, summary.warn_count, summary.info_count
    ));

    for (severity, heading) in [
        (Severity::Critical, "Critical Issues"),
        (Severity::Warn, "Warnings"),
        (Severity::Info, "Info"),
    ] {
        let group: Vec<&Issue> = review
            .issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .collect();
        if group.is_empty() {
            continue;
        }
        out.push_str(&format!("## {}\n\n", heading));
        for issue in group {
            render_issue(&mut out, issue);
        }
    }

    if review.issues.is_empty() {
        out.push_str("No issues found.\n\n");
    }

    if !review.questions.is_empty() {
        out.push_str("## Questions\n\n");
        for q in &review.questions {
            out.push_str(&format!("### {} [{}]\n\n", q.question, q.severity));
            out.push_str(&format!("{}\n\n", q.why_needed));
            render_evidence(&mut out, &q.evidence);
            if !q.suggested_answers.is_empty() {
                out.push_str("\n**Suggested answers:**\n");
                for answer in &q.suggested_answers {
                    out.push_str(&format!("- {}\n", answer));
                }
            }
            out.push('\n');
        }
    }

    if !review.patches.is_empty() {
        out.push_str("## Suggested Patches\n\n");
        for patch in &review.patches {
            out.push_str(&format!("### {}\n\n", patch.title));
            out.push_str("```diff\n");
            out.push_str(patch.diff_unified.trim_end_matches('\n'));
            out.push_str("\n```\n\n");
        }
    }

    if !review.checklists.is_empty() {
        out.push_str("## Checklists\n\n");
        for checklist in &review.checklists {
            out.push_str(&format!("### {}\n\n", checklist.title));
            for item in &checklist.checks {
                out.push_str(&format!("- [{}] {}\n", item.status, item.check));
            }
            out.push('\n');
        }
    }

    if !review.input.context_files.is_empty() {
        out.push_str("## Context Used\n\n");
        for file in &review.input.context_files {
            out.push_str(&format!("- {}\n", file.path));
        }
        out.push('\n');
    }

    out
}

fn render_issue(out: &mut String, issue: &Issue) {
    out.push_str(&format!(
        "### {} [{} / {}]\n\n",
        issue.title, issue.severity, issue.category
    ));
    if !issue.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n\n", issue.tags.join(", ")));
    }
    out.push_str(&format!("{}\n\n", issue.description));
    render_evidence(out, &issue.evidence);
    out.push('\n');
    if !issue.impact.is_empty() {
        out.push_str(&format!("**Impact:** {}\n\n", issue.impact));
    }
    if !issue.recommendation.is_empty() {
        out.push_str(&format!("**Recommendation:** {}\n\n", issue.recommendation));
    }
}

fn render_evidence(out: &mut String, evidence: &[Evidence]) {
    for ev in evidence {
        out.push_str(&format!(
            "> {} (L{}-{})\n",
            ev.quote, ev.line_start, ev.line_end
        ));
    }
}
