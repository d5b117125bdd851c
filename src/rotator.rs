//! Auto-advancing slide rotator
//!
//! A [`Page`] holds the slide elements declared in the configuration.
//! [`start_rotation`] selects the slides matching a class selector and moves
//! a single "active" marker across them on a fixed timer. Rotators share no
//! state, so several can run at different periods.

use crate::config::SlideGroupConfig;
use crate::error::{Result, SitechatError};

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// One slide element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// CSS classes of the element, without the leading dot
    pub classes: Vec<String>,
    /// Background image asset
    pub image: String,
}

impl Slide {
    /// Whether this slide matches a `.class` selector
    pub fn matches(&self, selector: &str) -> bool {
        selector
            .strip_prefix('.')
            .map(|class| self.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }
}

/// The slide elements of a page, in document order
#[derive(Debug, Clone, Default)]
pub struct Page {
    slides: Vec<Slide>,
}

impl Page {
    /// Build a page from configured slide groups
    pub fn from_groups(groups: &[SlideGroupConfig]) -> Self {
        let slides = groups
            .iter()
            .flat_map(|group| {
                let class = group.selector.trim_start_matches('.').to_string();
                group.images.iter().map(move |image| Slide {
                    classes: vec![class.clone()],
                    image: image.clone(),
                })
            })
            .collect();
        Self { slides }
    }

    /// All slides matching a class selector, in document order
    pub fn select_all(&self, selector: &str) -> Vec<Slide> {
        self.slides
            .iter()
            .filter(|s| s.matches(selector))
            .cloned()
            .collect()
    }
}

/// A running rotation
///
/// The cursor is published on a watch channel; exactly one slide is active
/// at any time. Dropping the handle stops the timer.
#[derive(Debug)]
pub struct Rotation {
    selector: String,
    slides: Vec<Slide>,
    cursor: watch::Receiver<usize>,
    task: JoinHandle<()>,
}

impl Rotation {
    /// Selector this rotation was started for
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Number of slides in the rotation
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false; rotations are never started over zero slides
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Index of the active slide
    pub fn active_index(&self) -> usize {
        *self.cursor.borrow()
    }

    /// The active slide
    pub fn active_slide(&self) -> &Slide {
        &self.slides[self.active_index()]
    }

    /// Per-slide active markers; exactly one is `true`
    pub fn active_flags(&self) -> Vec<bool> {
        let active = self.active_index();
        (0..self.slides.len()).map(|i| i == active).collect()
    }

    /// Receiver notified on every advance
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.cursor.clone()
    }
}

impl Drop for Rotation {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start rotating the slides matching `selector`
///
/// The first slide is active immediately; every `interval` the marker moves
/// to the next slide, wrapping around. Must be called from within a tokio
/// runtime.
///
/// Returns `Ok(None)` when nothing matches.
///
/// # Errors
///
/// Returns error if `interval` is zero
pub fn start_rotation(page: &Page, selector: &str, interval: Duration) -> Result<Option<Rotation>> {
    if interval.is_zero() {
        return Err(SitechatError::Config(format!(
            "rotation interval for {} must be greater than 0",
            selector
        ))
        .into());
    }

    let slides = page.select_all(selector);
    if slides.is_empty() {
        tracing::debug!(selector = %selector, "No slides match, rotation not started");
        return Ok(None);
    }

    let count = slides.len();
    let (tx, rx) = watch::channel(0usize);

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let next = (*tx.borrow() + 1) % count;
            if tx.send(next).is_err() {
                break;
            }
        }
    });

    tracing::debug!(selector = %selector, slides = count, interval_ms = interval.as_millis() as u64, "Rotation started");

    Ok(Some(Rotation {
        selector: selector.to_string(),
        slides,
        cursor: rx,
        task,
    }))
}

/// Start one rotation per configured slide group
///
/// Groups that match nothing are skipped.
///
/// # Errors
///
/// Returns error if a group has a zero interval
pub fn start_configured(groups: &[SlideGroupConfig]) -> Result<Vec<Rotation>> {
    let page = Page::from_groups(groups);
    let mut rotations = Vec::new();
    for group in groups {
        if let Some(rotation) = start_rotation(
            &page,
            &group.selector,
            Duration::from_millis(group.interval_ms),
        )? {
            rotations.push(rotation);
        }
    }
    Ok(rotations)
}
