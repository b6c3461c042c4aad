use std::{future::Future, time::Duration};
use tokio::{task::JoinHandle, time::sleep};

/// Slot for one delayed action. Scheduling again, cancelling or dropping the slot
/// aborts whatever was still waiting in it.
#[derive(Debug, Default)]
pub struct PendingTask {
    handle: Option<JoinHandle<()>>,
}

impl PendingTask {
    pub fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            sleep(delay).await;
            task.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for PendingTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };

    async fn bump(counter: Arc<AtomicU32>, amount: u32) {
        counter.fetch_add(amount, Ordering::SeqCst);
    }

    #[tokio::test(start_paused = true)]
    async fn task_runs_after_delay() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut slot = PendingTask::default();
        slot.schedule(Duration::from_millis(3000), bump(Arc::clone(&counter), 1));

        sleep(Duration::from_millis(2999)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(slot.is_pending());

        sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_drops_the_stale_task() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut slot = PendingTask::default();
        slot.schedule(Duration::from_millis(100), bump(Arc::clone(&counter), 1));
        slot.schedule(Duration::from_millis(100), bump(Arc::clone(&counter), 10));

        sleep(Duration::from_millis(500)).await;
        tokio::task::yield_now().await;
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_runs() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut slot = PendingTask::default();
        slot.schedule(Duration::from_millis(100), bump(Arc::clone(&counter), 1));
        slot.cancel();
        assert!(!slot.is_pending());

        sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
