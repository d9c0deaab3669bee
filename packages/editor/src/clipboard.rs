use domus_automation::{Config, NodeSort};

/// Session-scoped clipboard for cut/copied node values
///
/// One slot per node sort, so copying an action does not clobber a
/// previously copied condition. The clipboard is owned by the session
/// and handed to the mutation engine explicitly; last writer wins.
#[derive(Debug, Default)]
pub struct Clipboard {
    action: Option<Config>,
    condition: Option<Config>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a deep copy of a node value
    pub fn store(&mut self, sort: NodeSort, config: Config) {
        tracing::debug!("[Clipboard] storing {:?} entry", sort);
        match sort {
            NodeSort::Action => self.action = Some(config),
            NodeSort::Condition => self.condition = Some(config),
        }
    }

    /// Deep copy of the stored value, if any
    ///
    /// Each call clones again so repeated pastes never alias.
    pub fn peek(&self, sort: NodeSort) -> Option<Config> {
        match sort {
            NodeSort::Action => self.action.clone(),
            NodeSort::Condition => self.condition.clone(),
        }
    }

    pub fn is_empty(&self, sort: NodeSort) -> bool {
        match sort {
            NodeSort::Action => self.action.is_none(),
            NodeSort::Condition => self.condition.is_none(),
        }
    }

    pub fn clear(&mut self, sort: NodeSort) {
        match sort {
            NodeSort::Action => self.action = None,
            NodeSort::Condition => self.condition = None,
        }
    }
}
