//! Replacement planning: prompt answers become an ordered rule table.
//!
//! Templates reproduce the exact macro lines, indentation and trailing
//! newline included, so a fired rule writes its line verbatim.

use memchr::memmem;

/// User answers gathered before any file is touched.
///
/// All fields hold raw prompt text; nothing is validated or coerced. A
/// malformed radius or index token is interpolated verbatim and surfaces
/// as invalid macro code downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    /// Beam radius text, interpolated into four templates
    pub beam_radius: String,

    /// Index tokens excluded from the projection loop, in entry order
    pub excluded_indices: Vec<String>,

    /// Whether the Legendre-fit call stays active
    pub fit_enabled: bool,
}

/// How a rule recognizes its target line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Trimmed line starts with the literal
    Prefix(&'static str),
    /// Raw line contains the literal anywhere
    Contains(&'static str),
}

/// One substitution rule: a literal pattern paired with the fully-formed
/// replacement line.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pub pattern: Pattern,
    pub replacement: String,
    /// Fires for the first matching line only
    pub one_shot: bool,
}

impl RewriteRule {
    /// Test `line` against the pattern. Prefix rules see the line with
    /// surrounding whitespace stripped; contains rules see it raw.
    pub fn matches(&self, line: &str) -> bool {
        match self.pattern {
            Pattern::Prefix(lit) => line.trim().starts_with(lit),
            Pattern::Contains(lit) => memmem::find(line.as_bytes(), lit.as_bytes()).is_some(),
        }
    }
}

/// Ordered rule table for one rewrite pass.
///
/// Rule order matters: every rule is tested in sequence against the same
/// line buffer, so a rule late in the table sees the replacements made by
/// earlier ones.
#[derive(Debug, Clone)]
pub struct RewritePlan {
    pub rules: Vec<RewriteRule>,
}

impl RewritePlan {
    /// Build the six-rule table from the collected answers.
    pub fn from_answers(answers: &Answers) -> Self {
        let radius = answers.beam_radius.as_str();
        let rules = vec![
            RewriteRule {
                pattern: Pattern::Prefix("TFile* isoData ="),
                replacement: file_open_line(radius),
                one_shot: false,
            },
            RewriteRule {
                pattern: Pattern::Prefix("rtpath+="),
                replacement: accum_line("rtpath", radius),
                one_shot: true,
            },
            RewriteRule {
                pattern: Pattern::Prefix("hpath+="),
                replacement: accum_line("hpath", radius),
                one_shot: true,
            },
            RewriteRule {
                pattern: Pattern::Prefix("if(i!=0"),
                replacement: filter_line(&answers.excluded_indices),
                one_shot: false,
            },
            RewriteRule {
                pattern: Pattern::Prefix("cpath+="),
                replacement: accum_line("cpath", radius),
                one_shot: true,
            },
            RewriteRule {
                pattern: Pattern::Contains("g->Fit("),
                replacement: fit_line(answers.fit_enabled),
                one_shot: false,
            },
        ];
        Self { rules }
    }
}

/// `TFile* isoData = ...` open statement with the radius baked into the
/// converted-data path.
pub fn file_open_line(radius: &str) -> String {
    format!(
        "\tTFile* isoData = new TFile(\"/home/data/cnatzke/SimulationResults/Converted{radius}mm.root\");\n"
    )
}

/// Radius accumulation for one of the output-path variables.
pub fn accum_line(var: &str, radius: &str) -> String {
    format!("\t\t{var}+={radius};\n")
}

/// Index filter for the projection loop. Index 0 is always skipped; the
/// excluded tokens are appended verbatim, in entry order.
pub fn filter_line(excluded: &[String]) -> String {
    let mut line = String::from("\t\tif(i!=0");
    for tok in excluded {
        line.push_str("&&i!=");
        line.push_str(tok);
    }
    line.push_str("){\n");
    line
}

/// Legendre-fit call, active or commented out.
pub fn fit_line(enabled: bool) -> String {
    if enabled {
        "\t\tg->Fit(\"efit\");\n".to_string()
    } else {
        "//\t\tg->Fit(\"efit\");\n".to_string()
    }
}

/// Split a comma-delimited filter answer into tokens, preserving
/// whitespace and malformed entries verbatim. An empty answer means no
/// exclusions, not one empty token.
pub fn split_indices(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(radius: &str) -> Answers {
        Answers {
            beam_radius: radius.to_string(),
            excluded_indices: Vec::new(),
            fit_enabled: false,
        }
    }

    #[test]
    fn test_file_open_template() {
        let line = file_open_line("25");
        assert_eq!(
            line,
            "\tTFile* isoData = new TFile(\"/home/data/cnatzke/SimulationResults/Converted25mm.root\");\n"
        );
        assert!(line.contains("Converted25mm.root"));
    }

    #[test]
    fn test_accum_templates_embed_radius() {
        assert_eq!(accum_line("rtpath", "25"), "\t\trtpath+=25;\n");
        assert_eq!(accum_line("cpath", "25"), "\t\tcpath+=25;\n");
        assert_eq!(accum_line("hpath", "25"), "\t\thpath+=25;\n");
        for var in ["rtpath", "cpath", "hpath"] {
            assert!(accum_line(var, "40").contains("+=40;"));
        }
    }

    #[test]
    fn test_filter_line_default_has_no_exclusions() {
        assert_eq!(filter_line(&[]), "\t\tif(i!=0){\n");
    }

    #[test]
    fn test_filter_line_appends_tokens_in_entry_order() {
        let toks = vec!["3".to_string(), "7".to_string()];
        assert_eq!(filter_line(&toks), "\t\tif(i!=0&&i!=3&&i!=7){\n");
    }

    #[test]
    fn test_filter_line_keeps_malformed_tokens_verbatim() {
        let toks = vec![" 3".to_string(), "x".to_string(), String::new()];
        assert_eq!(filter_line(&toks), "\t\tif(i!=0&&i!= 3&&i!=x&&i!=){\n");
    }

    #[test]
    fn test_split_indices_empty_means_no_exclusions() {
        assert!(split_indices("").is_empty());
    }

    #[test]
    fn test_split_indices_preserves_tokens() {
        assert_eq!(split_indices("3,7"), vec!["3", "7"]);
        assert_eq!(split_indices("3, 7"), vec!["3", " 7"]);
        assert_eq!(split_indices("3,"), vec!["3", ""]);
    }

    #[test]
    fn test_fit_line_toggle() {
        assert_eq!(fit_line(true), "\t\tg->Fit(\"efit\");\n");
        assert_eq!(fit_line(false), "//\t\tg->Fit(\"efit\");\n");
    }

    #[test]
    fn test_plan_rule_order_and_one_shot_marking() {
        let a = Answers {
            beam_radius: "25".to_string(),
            excluded_indices: vec!["3".to_string()],
            fit_enabled: true,
        };
        let plan = RewritePlan::from_answers(&a);

        let patterns: Vec<Pattern> = plan.rules.iter().map(|r| r.pattern).collect();
        assert_eq!(
            patterns,
            vec![
                Pattern::Prefix("TFile* isoData ="),
                Pattern::Prefix("rtpath+="),
                Pattern::Prefix("hpath+="),
                Pattern::Prefix("if(i!=0"),
                Pattern::Prefix("cpath+="),
                Pattern::Contains("g->Fit("),
            ]
        );

        let one_shots: Vec<bool> = plan.rules.iter().map(|r| r.one_shot).collect();
        assert_eq!(one_shots, vec![false, true, true, false, true, false]);
    }

    #[test]
    fn test_prefix_match_ignores_indentation() {
        let plan = RewritePlan::from_answers(&answers("25"));
        let rtpath = &plan.rules[1];
        assert!(rtpath.matches("    rtpath+=10;\n"));
        assert!(rtpath.matches("\t\trtpath+=10;"));
        assert!(!rtpath.matches("\t\tpath+=10;"));
    }

    #[test]
    fn test_contains_match_hits_anywhere_in_the_line() {
        let plan = RewritePlan::from_answers(&answers("25"));
        let fit = plan.rules.last().unwrap();
        assert!(fit.matches("\t\tg->Fit(\"efit\",\"ERQM\");\n"));
        assert!(fit.matches("//\t\tg->Fit(\"efit\");\n"));
        assert!(!fit.matches("\t\tgStyle->SetOptFit(2);\n"));
    }
}
