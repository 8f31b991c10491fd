use std::future::Future;

/// Spawns a fire-and-forget task on the current runtime.
pub fn spawn<T>(future: T)
where
    T: Future + Send + 'static,
    T::Output: Send + 'static,
{
    tokio::spawn(future);
}
