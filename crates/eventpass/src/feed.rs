//! Live view of the notification list.

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::Stream;

use crate::registration::Notification;

/// A stream of notification lists.
///
/// The first item is the list as it was when the feed was created; after
/// that one item is yielded per committed registration, in write order. A
/// slow consumer only ever sees the newest list, never a stale one. The
/// stream ends when the owning store is dropped.
pub struct NotificationFeed {
    inner: WatchStream<Vec<Notification>>,
}

impl NotificationFeed {
    pub(crate) fn new(receiver: watch::Receiver<Vec<Notification>>) -> Self {
        Self {
            inner: WatchStream::new(receiver),
        }
    }
}

impl std::fmt::Debug for NotificationFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationFeed").finish_non_exhaustive()
    }
}

impl Stream for NotificationFeed {
    type Item = Vec<Notification>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
