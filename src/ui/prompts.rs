//! Canned prompts offered by the sidebar and the welcome screen.

pub struct QuickPrompt {
    pub label: &'static str,
    pub message: &'static str,
}

pub struct SidebarSection {
    pub heading: &'static str,
    pub prompts: &'static [QuickPrompt],
}

pub const SIDEBAR_SECTIONS: &[SidebarSection] = &[
    SidebarSection {
        heading: "How are you feeling?",
        prompts: &[
            QuickPrompt {
                label: "Excited",
                message: "I'm excited about my career but not sure where to start.",
            },
            QuickPrompt {
                label: "Confused",
                message: "I'm feeling confused about my career options.",
            },
            QuickPrompt {
                label: "Stressed",
                message: "I'm stressed about finding a job.",
            },
        ],
    },
    SidebarSection {
        heading: "Quick actions",
        prompts: &[
            QuickPrompt {
                label: "Career assessment",
                message: "Help me with a career assessment.",
            },
            QuickPrompt {
                label: "Browse careers",
                message: "Show me some career paths I could explore.",
            },
            QuickPrompt {
                label: "Learning resources",
                message: "What are some good resources for learning new skills?",
            },
        ],
    },
];

/// Starter prompts shown on the welcome screen, reachable with Alt+1..=3.
pub const WELCOME_PROMPTS: &[QuickPrompt] = &[
    QuickPrompt {
        label: "Career assessment",
        message: "Can you help me with a career assessment?",
    },
    QuickPrompt {
        label: "Course recommendations",
        message: "Can you recommend some courses for me?",
    },
    QuickPrompt {
        label: "Internship help",
        message: "I need help finding an internship.",
    },
];

/// Flat view of the sidebar prompts in display order, for selection math.
pub fn sidebar_prompt(index: usize) -> Option<&'static QuickPrompt> {
    SIDEBAR_SECTIONS
        .iter()
        .flat_map(|section| section.prompts.iter())
        .nth(index)
}

pub fn sidebar_prompt_count() -> usize {
    SIDEBAR_SECTIONS.iter().map(|s| s.prompts.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_indexing_spans_all_sections() {
        assert_eq!(sidebar_prompt_count(), 6);
        assert_eq!(sidebar_prompt(0).map(|p| p.label), Some("Excited"));
        assert_eq!(sidebar_prompt(3).map(|p| p.label), Some("Career assessment"));
        assert!(sidebar_prompt(6).is_none());
    }
}
