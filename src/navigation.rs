//! Dashboard view state: network -> report -> category -> charts.
//!
//! Transitions are a pure function of (state, event). The `Navigator` holds
//! the current state plus an explicit list of render callbacks, called
//! synchronously after every successful transition.

use serde::Serialize;

use crate::error::{DashError, Result};
use crate::logging;
use crate::report::Category;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    NetworkSelection,
    ReportSelection {
        network: String,
    },
    CategorySelection {
        network: String,
        report: String,
    },
    ChartDisplay {
        network: String,
        report: String,
        category: Category,
    },
}

impl ViewState {
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::NetworkSelection => "network_selection",
            ViewState::ReportSelection { .. } => "report_selection",
            ViewState::CategorySelection { .. } => "category_selection",
            ViewState::ChartDisplay { .. } => "chart_display",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    SelectNetwork(String),
    SelectReport(String),
    SelectCategory(Category),
    Back,
    Reset,
}

impl NavEvent {
    fn name(&self) -> &'static str {
        match self {
            NavEvent::SelectNetwork(_) => "select_network",
            NavEvent::SelectReport(_) => "select_report",
            NavEvent::SelectCategory(_) => "select_category",
            NavEvent::Back => "back",
            NavEvent::Reset => "reset",
        }
    }
}

fn invalid(state: &ViewState, event: &NavEvent) -> DashError {
    DashError::InvalidTransition(format!("{} from {}", event.name(), state.name()))
}

pub fn next_state(state: &ViewState, event: &NavEvent) -> Result<ViewState> {
    use ViewState::*;

    match (state, event) {
        (_, NavEvent::Reset) => Ok(NetworkSelection),

        (NetworkSelection, NavEvent::SelectNetwork(network)) if !network.is_empty() => {
            Ok(ReportSelection {
                network: network.clone(),
            })
        }
        (ReportSelection { network }, NavEvent::SelectReport(report)) if !report.is_empty() => {
            Ok(CategorySelection {
                network: network.clone(),
                report: report.clone(),
            })
        }
        // switching category while charts are shown replaces the view
        (CategorySelection { network, report }, NavEvent::SelectCategory(category))
        | (ChartDisplay { network, report, .. }, NavEvent::SelectCategory(category)) => {
            Ok(ChartDisplay {
                network: network.clone(),
                report: report.clone(),
                category: *category,
            })
        }

        (ReportSelection { .. }, NavEvent::Back) => Ok(NetworkSelection),
        (CategorySelection { network, .. }, NavEvent::Back) => Ok(ReportSelection {
            network: network.clone(),
        }),
        (ChartDisplay { network, report, .. }, NavEvent::Back) => Ok(CategorySelection {
            network: network.clone(),
            report: report.clone(),
        }),

        _ => Err(invalid(state, event)),
    }
}

pub type Subscriber = Box<dyn FnMut(&ViewState)>;

pub struct Navigator {
    state: ViewState,
    subscribers: Vec<(usize, Subscriber)>,
    next_id: usize,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            state: ViewState::NetworkSelection,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Register a render callback; returns an id for `unsubscribe`.
    pub fn subscribe(&mut self, callback: impl FnMut(&ViewState) + 'static) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: usize) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Apply an event. On error the state is left untouched and no
    /// subscriber runs.
    pub fn apply(&mut self, event: NavEvent) -> Result<&ViewState> {
        let next = next_state(&self.state, &event)?;
        logging::log_transition(self.state.name(), next.name(), event.name());
        self.state = next;
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&self.state);
        }
        Ok(&self.state)
    }

    pub fn select_network(&mut self, network: &str) -> Result<&ViewState> {
        self.apply(NavEvent::SelectNetwork(network.to_string()))
    }

    pub fn select_report(&mut self, report: &str) -> Result<&ViewState> {
        self.apply(NavEvent::SelectReport(report.to_string()))
    }

    pub fn select_category(&mut self, category_id: &str) -> Result<&ViewState> {
        let category = Category::parse(category_id)?;
        self.apply(NavEvent::SelectCategory(category))
    }

    pub fn back(&mut self) -> Result<&ViewState> {
        self.apply(NavEvent::Back)
    }

    pub fn reset(&mut self) -> Result<&ViewState> {
        self.apply(NavEvent::Reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_forward_path() {
        let mut nav = Navigator::new();
        nav.select_network("mainnet").unwrap();
        nav.select_report("2024-06").unwrap();
        let state = nav.select_category("vaults").unwrap().clone();
        assert_eq!(
            state,
            ViewState::ChartDisplay {
                network: "mainnet".into(),
                report: "2024-06".into(),
                category: Category::Vaults,
            }
        );
    }

    #[test]
    fn test_back_walks_up() {
        let mut nav = Navigator::new();
        nav.select_network("mainnet").unwrap();
        nav.select_report("r").unwrap();
        nav.select_category("operators").unwrap();
        assert_eq!(nav.back().unwrap().name(), "category_selection");
        assert_eq!(nav.back().unwrap().name(), "report_selection");
        assert_eq!(nav.back().unwrap().name(), "network_selection");
        assert!(matches!(nav.back(), Err(DashError::InvalidTransition(_))));
    }

    #[test]
    fn test_invalid_transition_keeps_state() {
        let mut nav = Navigator::new();
        assert!(nav.select_report("r").is_err());
        assert_eq!(nav.state(), &ViewState::NetworkSelection);
        assert!(nav.select_network("").is_err());
        assert_eq!(nav.state(), &ViewState::NetworkSelection);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut nav = Navigator::new();
        nav.select_network("n").unwrap();
        nav.select_report("r").unwrap();
        assert!(matches!(nav.select_category("collateral"), Err(DashError::UnknownCategory(_))));
        assert_eq!(nav.state().name(), "category_selection");
    }

    #[test]
    fn test_category_switch_in_display() {
        let mut nav = Navigator::new();
        nav.select_network("n").unwrap();
        nav.select_report("r").unwrap();
        nav.select_category("vaults").unwrap();
        let s = nav.select_category("curators").unwrap();
        assert!(matches!(s, ViewState::ChartDisplay { category: Category::Curators, .. }));
    }

    #[test]
    fn test_subscribers_run_after_each_transition() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut nav = Navigator::new();
        let sink = Rc::clone(&seen);
        let id = nav.subscribe(move |s| sink.borrow_mut().push(s.name()));
        nav.select_network("n").unwrap();
        let _ = nav.select_category("vaults"); // invalid here, no callback
        nav.reset().unwrap();
        assert_eq!(*seen.borrow(), vec!["report_selection", "network_selection"]);
        assert!(nav.unsubscribe(id));
        nav.select_network("n").unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }
}
