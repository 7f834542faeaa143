#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Background operations the reducer tracks. One of each kind runs at a time;
/// a result whose id is no longer active is stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    PageLoad,
    CartMutation,
    Auth,
    Checkout,
    Metrics,
}

#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, id: TaskId) {
        self.active = Some(id);
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
        }
        ok
    }

    /// Whether `id` is the running task, without finishing it.
    pub fn is_active(&self, id: TaskId) -> bool {
        self.active == Some(id)
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub page_load: TaskState,
    pub cart_mutation: TaskState,
    pub auth: TaskState,
    pub checkout: TaskState,
    pub metrics: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::PageLoad => &self.page_load,
            TaskKind::CartMutation => &self.cart_mutation,
            TaskKind::Auth => &self.auth,
            TaskKind::Checkout => &self.checkout,
            TaskKind::Metrics => &self.metrics,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::PageLoad => &mut self.page_load,
            TaskKind::CartMutation => &mut self.cart_mutation,
            TaskKind::Auth => &mut self.auth,
            TaskKind::Checkout => &mut self.checkout,
            TaskKind::Metrics => &mut self.metrics,
        }
    }

    /// Long-lived streams do not count; they would keep the loop polling fast.
    pub fn is_any_running(&self) -> bool {
        self.page_load.is_running()
            || self.cart_mutation.is_running()
            || self.auth.is_running()
            || self.checkout.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_results_are_rejected() {
        let mut seq = TaskSeq::default();
        let mut tasks = Tasks::default();

        let first = seq.next_id();
        tasks.state_mut(TaskKind::PageLoad).start(first);
        let second = seq.next_id();
        tasks.state_mut(TaskKind::PageLoad).start(second);

        assert!(!tasks.state_mut(TaskKind::PageLoad).finish_if_active(first));
        assert!(tasks.state(TaskKind::PageLoad).is_running());
        assert!(tasks.state_mut(TaskKind::PageLoad).finish_if_active(second));
        assert!(!tasks.is_any_running());
    }

    #[test]
    fn test_metrics_stream_does_not_count_as_busy() {
        let mut tasks = Tasks::default();
        tasks.state_mut(TaskKind::Metrics).start(TaskId(7));
        assert!(!tasks.is_any_running());
        assert!(tasks.state(TaskKind::Metrics).is_active(TaskId(7)));
    }
}
