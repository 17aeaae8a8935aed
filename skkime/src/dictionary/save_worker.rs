use crate::dictionary::user_dict::UserDictInner;
use crate::error::SkkError;
use log::*;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub(crate) enum SaveMessage {
    /// 保存要求。最後の要求からinterval経過したら一度だけ書き込む。
    Save,
    /// 外部で辞書が書き換えられたので読み直す。
    Reload,
    /// 保留中の保存があればすぐ書き込み、書き込んだかどうかを返す。
    Flush(mpsc::Sender<bool>),
    Shutdown,
}

///
/// ユーザー辞書の保存を受け持つスレッド。
/// 短期間に複数の保存要求があっても一回にまとめる。
///
pub(crate) struct SaveWorker {
    sender: mpsc::Sender<SaveMessage>,
    handle: Option<JoinHandle<()>>,
}

impl SaveWorker {
    pub(crate) fn spawn(inner: Arc<UserDictInner>, interval: Duration) -> Result<Self, SkkError> {
        let (sender, receiver) = mpsc::channel::<SaveMessage>();
        let handle = thread::Builder::new()
            .name("skkime-userdict".into())
            .spawn(move || save_worker(receiver, inner, interval))?;
        Ok(SaveWorker {
            sender,
            handle: Some(handle),
        })
    }

    pub(crate) fn send(&self, message: SaveMessage) {
        if self.sender.send(message).is_err() {
            warn!("User dictionary worker has already stopped");
        }
    }
}

impl Drop for SaveWorker {
    fn drop(&mut self) {
        let _ = self.sender.send(SaveMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("User dictionary worker panicked");
            }
        }
    }
}

fn save_worker(
    receiver: mpsc::Receiver<SaveMessage>,
    inner: Arc<UserDictInner>,
    interval: Duration,
) {
    let mut deadline: Option<Instant> = None;
    loop {
        let received = match deadline {
            Some(at) => {
                let now = Instant::now();
                if now >= at {
                    Err(RecvTimeoutError::Timeout)
                } else {
                    receiver.recv_timeout(at - now)
                }
            }
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(SaveMessage::Save) => {
                deadline = Some(Instant::now() + interval);
            }
            Ok(SaveMessage::Reload) => {
                // 読み直した内容で置き換わるので保留中の保存は捨てる
                deadline = None;
                if let Err(e) = inner.load() {
                    error!("Failed to reload user dictionary: {}", e);
                }
            }
            Ok(SaveMessage::Flush(reply)) => {
                let saved = deadline.is_some() && write(&inner);
                if deadline.is_some() && !saved {
                    deadline = Some(Instant::now() + interval);
                } else {
                    deadline = None;
                }
                let _ = reply.send(saved);
            }
            Err(RecvTimeoutError::Timeout) => {
                deadline = if write(&inner) {
                    None
                } else {
                    // 次の周期でもう一度書き込む
                    Some(Instant::now() + interval)
                };
            }
            Ok(SaveMessage::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                if deadline.is_some() {
                    write(&inner);
                }
                debug!("User dictionary worker stopped");
                break;
            }
        }
    }
}

fn write(inner: &UserDictInner) -> bool {
    match inner.save() {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to save user dictionary: {}", e);
            false
        }
    }
}
