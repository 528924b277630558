//! The rendered window over a room log.
//!
//! The window is always a contiguous suffix of the log.  It starts at one
//! page and each backward extension recomputes it as the newest
//! `min(len, pageCount * pageSize)` messages.  Tail appends grow it by one
//! message without changing the page count, so after appends the window can
//! be longer than its pages; an extension never shrinks it.

use murmur_store::Message;

/// What a successful backward extension changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extension {
    /// Messages prepended to the window.
    pub added: usize,
    pub page_count: usize,
    pub window_len: usize,
}

#[derive(Debug, Clone)]
pub struct WindowManager {
    page_size: usize,
    page_count: usize,
    window: Vec<Message>,
    total_len: usize,
    loading_older: bool,
}

impl WindowManager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page_count: 1,
            window: Vec::new(),
            total_len: 0,
            loading_older: false,
        }
    }

    /// Reset to the most recent page of `log`.
    pub fn initialize(&mut self, log: &[Message]) {
        self.page_count = 1;
        self.loading_older = false;
        self.total_len = log.len();
        self.window = suffix(log, self.page_size).to_vec();
    }

    pub fn window(&self) -> &[Message] {
        &self.window
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Pages needed to show the whole log, for "page X of Y" displays.
    pub fn total_pages(&self) -> usize {
        self.total_len.div_ceil(self.page_size)
    }

    pub fn is_loading_older(&self) -> bool {
        self.loading_older
    }

    /// True while older messages exist outside the window.
    ///
    /// That is `pageCount * pageSize < len`, except when tail appends have
    /// already brought the whole log into view.
    pub fn can_extend(&self) -> bool {
        self.page_count * self.page_size < self.total_len && self.window.len() < self.total_len
    }

    /// Claim the single in-flight extension slot.
    ///
    /// Returns `false` (and changes nothing) if an extension is already
    /// outstanding or there is nothing older to show.
    pub fn begin_extension(&mut self) -> bool {
        if self.loading_older {
            tracing::debug!("older page already loading; ignoring request");
            return false;
        }
        if !self.can_extend() {
            return false;
        }
        self.loading_older = true;
        true
    }

    /// Release the in-flight slot without extending.
    pub fn cancel_extension(&mut self) {
        self.loading_older = false;
    }

    /// Finish the outstanding extension against the current log.
    pub fn complete_extension(&mut self, log: &[Message]) -> Option<Extension> {
        if !std::mem::take(&mut self.loading_older) {
            return None;
        }

        self.total_len = log.len();
        if self.window.len() >= self.total_len {
            return None;
        }

        self.page_count += 1;
        let old_len = self.window.len();
        let target = (self.page_count * self.page_size)
            .min(log.len())
            .max(old_len);
        self.window = suffix(log, target).to_vec();

        Some(Extension {
            added: self.window.len().saturating_sub(old_len),
            page_count: self.page_count,
            window_len: self.window.len(),
        })
    }

    /// Extend immediately; a no-op while another extension is in flight.
    pub fn extend_backward(&mut self, log: &[Message]) -> Option<Extension> {
        if !self.begin_extension() {
            return None;
        }
        self.complete_extension(log)
    }

    /// Record a message appended to the end of the log.
    pub fn append_to_tail(&mut self, message: Message) {
        self.window.push(message);
        self.total_len += 1;
    }

    /// The messages an extension just prepended.
    pub fn head(&self, count: usize) -> &[Message] {
        &self.window[..count.min(self.window.len())]
    }
}

fn suffix(log: &[Message], len: usize) -> &[Message] {
    &log[log.len().saturating_sub(len)..]
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use murmur_shared::Sender;
    use murmur_store::seed::seed_history;

    use super::*;

    fn log_of(n: usize) -> Vec<Message> {
        seed_history(n, 1_000_000_000)
    }

    fn assert_suffix(wm: &WindowManager, log: &[Message]) {
        let w = wm.window();
        assert_eq!(w, &log[log.len() - w.len()..]);
    }

    #[test]
    fn initial_window_is_last_page() {
        let log = log_of(60);
        let mut wm = WindowManager::new(20);
        wm.initialize(&log);

        assert_eq!(wm.window().len(), 20);
        assert_eq!(wm.window()[0], log[40]);
        assert_eq!(wm.page_count(), 1);
        assert_eq!(wm.total_pages(), 3);
        assert!(wm.can_extend());
    }

    #[test]
    fn extend_adds_one_page() {
        let log = log_of(60);
        let mut wm = WindowManager::new(20);
        wm.initialize(&log);

        let ext = wm.extend_backward(&log).unwrap();
        assert_eq!(
            ext,
            Extension {
                added: 20,
                page_count: 2,
                window_len: 40
            }
        );
        assert_eq!(wm.head(ext.added), &log[20..40]);
        assert_suffix(&wm, &log);
    }

    #[test]
    fn full_window_cannot_extend() {
        let log = log_of(60);
        let mut wm = WindowManager::new(20);
        wm.initialize(&log);
        wm.extend_backward(&log);
        wm.extend_backward(&log);

        assert_eq!(wm.page_count(), 3);
        assert_eq!(wm.window().len(), 60);
        assert!(!wm.can_extend());
        assert_eq!(wm.extend_backward(&log), None);
        assert_eq!(wm.page_count(), 3);
        assert!(!wm.is_loading_older());
    }

    #[test]
    fn short_log_fits_in_one_page() {
        let log = log_of(7);
        let mut wm = WindowManager::new(20);
        wm.initialize(&log);
        assert_eq!(wm.window().len(), 7);
        assert!(!wm.can_extend());
        assert!(!wm.begin_extension());
    }

    #[test]
    fn concurrent_requests_extend_once() {
        let log = log_of(60);
        let mut wm = WindowManager::new(20);
        wm.initialize(&log);

        assert!(wm.begin_extension());
        assert!(!wm.begin_extension());
        assert_eq!(wm.extend_backward(&log), None);

        let ext = wm.complete_extension(&log).unwrap();
        assert_eq!(ext.page_count, 2);
        assert_eq!(wm.complete_extension(&log), None);
        assert_eq!(wm.page_count(), 2);
    }

    #[test]
    fn tail_appends_keep_page_count() {
        let mut log = log_of(60);
        let mut wm = WindowManager::new(20);
        wm.initialize(&log);

        let extra = Message::text(Sender::User, "new", 2_000_000_000).unwrap();
        log.push(extra.clone());
        wm.append_to_tail(extra.clone());

        assert_eq!(wm.page_count(), 1);
        assert_eq!(wm.window().len(), 21);
        assert_eq!(wm.window().last(), Some(&extra));
        assert_suffix(&wm, &log);

        let ext = wm.extend_backward(&log).unwrap();
        assert_eq!(ext.added, 19);
        assert_eq!(ext.window_len, 40);
        assert_eq!(wm.window().last(), Some(&extra));
        assert_suffix(&wm, &log);
    }

    #[test]
    fn extension_after_appends_fills_to_page_boundary() {
        let mut log = log_of(60);
        let mut wm = WindowManager::new(20);
        wm.initialize(&log);
        for i in 0..5 {
            let m = Message::text(Sender::User, format!("n{i}"), 2_000_000_000 + i).unwrap();
            log.push(m.clone());
            wm.append_to_tail(m);
        }

        let ext = wm.extend_backward(&log).unwrap();
        assert_eq!(
            ext,
            Extension {
                added: 15,
                page_count: 2,
                window_len: 40
            }
        );
        assert_suffix(&wm, &log);
    }

    #[test]
    fn appends_never_shrink_the_window() {
        let mut log = log_of(10);
        let mut wm = WindowManager::new(4);
        wm.initialize(&log);
        for i in 0..9 {
            let m = Message::text(Sender::User, format!("n{i}"), 2_000_000_000 + i).unwrap();
            log.push(m.clone());
            wm.append_to_tail(m);
        }
        assert_eq!(wm.window().len(), 13);

        // 2 pages of 4 is shorter than what is already shown
        let ext = wm.extend_backward(&log).unwrap();
        assert_eq!(ext.added, 0);
        assert_eq!(ext.window_len, 13);
        assert_suffix(&wm, &log);
    }

    #[test]
    fn random_operations_keep_suffix() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let page_size = rng.gen_range(1..15);
            let mut log = log_of(rng.gen_range(0..80));
            let mut wm = WindowManager::new(page_size);
            wm.initialize(&log);

            for step in 0..40 {
                let before = wm.window().len();
                let expected = if rng.gen_bool(0.5) {
                    match wm.extend_backward(&log) {
                        Some(_) => (wm.page_count() * page_size).min(log.len()).max(before),
                        None => before,
                    }
                } else {
                    let m = Message::text(Sender::User, format!("t{step}"), 2_000_000_000 + step as i64).unwrap();
                    log.push(m.clone());
                    wm.append_to_tail(m);
                    before + 1
                };

                assert_suffix(&wm, &log);
                assert_eq!(wm.window().len(), expected);
                assert!(wm.window().len() >= (wm.page_count() * page_size).min(log.len()));
                assert_eq!(wm.total_len(), log.len());
            }
        }
    }
}
