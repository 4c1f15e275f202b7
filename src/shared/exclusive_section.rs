use crate::shared::AppError;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

/// 非同期クリティカルセクションを到着順に一つずつ実行するガード
///
/// 各呼び出しは直前のセクションの完了シグナルを受け取り、自分のシグナルを
/// 次の呼び出しに渡す。シグナルはセクション終了時（エラー・panic を含む）に
/// 必ず解放される。タイムアウトやキャンセルはなく、終わらないセクションは
/// 後続をすべて待たせ続ける。
#[derive(Clone)]
pub struct ExclusiveSection {
    tail: Arc<Mutex<oneshot::Receiver<()>>>,
}

impl ExclusiveSection {
    pub fn new() -> Self {
        let (released, tail) = oneshot::channel();
        drop(released);
        Self {
            tail: Arc::new(Mutex::new(tail)),
        }
    }

    /// `section` を排他的に実行する。順番は `run` を呼んだ時点で確定する。
    ///
    /// セクションは別タスクで駆動されるため、呼び出し側が返り値の future を
    /// drop してもガードが早期に解放されることはない。
    pub fn run<F>(
        &self,
        section: F,
    ) -> impl Future<Output = Result<F::Output, AppError>> + Send + use<F>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (release, next) = oneshot::channel::<()>();
        let previous = {
            let mut tail = self.tail.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *tail, next)
        };

        let handle = tokio::spawn(async move {
            // 先行セクションの sender が drop されると Err で返る
            let _ = previous.await;
            let output = section.await;
            drop(release);
            output
        });

        async move {
            handle
                .await
                .map_err(|err| AppError::Internal(format!("exclusive section aborted: {err}")))
        }
    }
}

impl Default for ExclusiveSection {
    fn default() -> Self {
        Self::new()
    }
}
