//! Menu subsystem: build a set of options, render them through a display
//! collaborator, and resolve the user's reply into one or more selections.

/// The set of selectable options, in display order.
#[derive(Debug, Clone)]
pub struct Menu {
    pub options: Vec<String>,
    pub title: Option<String>,
    pub allow_back: bool,
}

/// Where a menu's options come from before they're realised into a flat
/// list: a literal list/dict, or a source that must be evaluated eagerly.
pub enum OptionSource {
    Literal(Vec<String>),
    /// Already-evaluated options from a callable data source or function
    /// invocation — the caller realises these eagerly before building.
    Realised(Vec<String>),
}

const BACK_OPTION: &str = "zBack";

impl Menu {
    /// Build a menu from a realised option source, optionally appending the
    /// `zBack` option.
    pub fn build(source: OptionSource, title: Option<String>, append_back: bool) -> Self {
        let mut options = match source {
            OptionSource::Literal(opts) | OptionSource::Realised(opts) => opts,
        };
        if append_back && !options.iter().any(|o| o == BACK_OPTION) {
            options.push(BACK_OPTION.to_string());
        }
        Menu { options, title, allow_back: append_back }
    }
}

/// The rendering/input collaborator a menu delegates to — implemented by
/// whichever transport (WebSocket bridge, terminal) is driving the session.
pub trait MenuDisplay {
    fn render(&mut self, menu: &Menu);
    /// Read one raw line of input from the user, already trimmed.
    fn read_line(&mut self) -> String;
}

/// The result of a menu interaction: one or more selected option values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Single(String),
    Multi(Vec<String>),
}

/// Render the menu and read selections until valid input is given.
/// Supports a comma-separated multi-select and a `/term` filter that
/// re-renders a narrowed menu instead of resolving a selection.
pub fn interact(menu: &Menu, display: &mut dyn MenuDisplay) -> Selection {
    let mut visible = menu.clone();
    loop {
        display.render(&visible);
        let input = display.read_line();

        if let Some(term) = input.strip_prefix('/') {
            let filtered: Vec<String> = visible
                .options
                .iter()
                .filter(|o| o.to_lowercase().contains(&term.to_lowercase()))
                .cloned()
                .collect();
            visible = Menu { options: filtered, title: visible.title.clone(), allow_back: visible.allow_back };
            continue;
        }

        if input.contains(',') {
            let indices: Option<Vec<usize>> = input.split(',').map(|s| parse_index(s.trim(), &visible)).collect();
            if let Some(indices) = indices {
                let selected = indices.into_iter().map(|i| visible.options[i].clone()).collect();
                return Selection::Multi(selected);
            }
            continue;
        }

        if let Some(index) = parse_index(&input, &visible) {
            return Selection::Single(visible.options[index].clone());
        }
    }
}

/// Accept either a 1-based numeric index or an exact option match.
fn parse_index(raw: &str, menu: &Menu) -> Option<usize> {
    if let Ok(n) = raw.parse::<usize>() {
        if n >= 1 && n <= menu.options.len() {
            return Some(n - 1);
        }
        return None;
    }
    menu.options.iter().position(|o| o == raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedDisplay {
        replies: std::vec::IntoIter<String>,
    }

    impl ScriptedDisplay {
        fn new(replies: &[&str]) -> Self {
            Self { replies: replies.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter() }
        }
    }

    impl MenuDisplay for ScriptedDisplay {
        fn render(&mut self, _menu: &Menu) {}
        fn read_line(&mut self) -> String {
            self.replies.next().expect("no more scripted replies")
        }
    }

    #[test]
    fn build_appends_zback_once() {
        let menu = Menu::build(OptionSource::Literal(vec!["A".into(), "B".into()]), None, true);
        assert_eq!(menu.options, vec!["A", "B", "zBack"]);
    }

    #[test]
    fn build_does_not_duplicate_zback() {
        let menu = Menu::build(OptionSource::Literal(vec!["A".into(), "zBack".into()]), None, true);
        assert_eq!(menu.options, vec!["A", "zBack"]);
    }

    #[test]
    fn interact_resolves_numeric_index() {
        let menu = Menu::build(OptionSource::Literal(vec!["B".into(), "zBack".into()]), None, false);
        let mut display = ScriptedDisplay::new(&["1"]);
        assert_eq!(interact(&menu, &mut display), Selection::Single("B".to_string()));
    }

    #[test]
    fn interact_resolves_exact_name_match() {
        let menu = Menu::build(OptionSource::Literal(vec!["B".into(), "zBack".into()]), None, false);
        let mut display = ScriptedDisplay::new(&["zBack"]);
        assert_eq!(interact(&menu, &mut display), Selection::Single("zBack".to_string()));
    }

    #[test]
    fn interact_supports_comma_separated_multi_select() {
        let menu = Menu::build(OptionSource::Literal(vec!["A".into(), "B".into(), "C".into()]), None, false);
        let mut display = ScriptedDisplay::new(&["1,3"]);
        assert_eq!(interact(&menu, &mut display), Selection::Multi(vec!["A".to_string(), "C".to_string()]));
    }

    #[test]
    fn interact_narrows_on_term_filter_then_resolves() {
        let menu = Menu::build(OptionSource::Literal(vec!["Apple".into(), "Banana".into()]), None, false);
        let mut display = ScriptedDisplay::new(&["/ban", "1"]);
        assert_eq!(interact(&menu, &mut display), Selection::Single("Banana".to_string()));
    }

    #[test]
    fn interact_reprompts_on_invalid_index() {
        let menu = Menu::build(OptionSource::Literal(vec!["A".into()]), None, false);
        let mut display = ScriptedDisplay::new(&["9", "1"]);
        assert_eq!(interact(&menu, &mut display), Selection::Single("A".to_string()));
    }
}
