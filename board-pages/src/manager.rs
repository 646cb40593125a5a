//! Page manager: which page is live on the canvas surface.
//!
//! The manager owns the surface, the history log and the pages. Every
//! structural change (add, switch, rename, delete, load) ends with a history
//! record. When the surface restores asynchronously that record is deferred
//! until `poll_restore` sees the restore complete, and every other request is
//! refused with `RestoreInFlight` in the meantime.

use board_core::{CanvasSurface, PageSize, Restore, Snapshot, SurfaceError};
use board_editor::HistoryManager;
use tracing::{debug, info, warn};

use crate::config::BoardConfig;
use crate::document::{decode_pages, encode_pages};
use crate::{default_page_name, Page, PageError};

/// A restore the surface has not finished yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRestore {
    /// Record history once the restore completes.
    record: bool,
}

#[derive(Debug)]
pub struct PageManager<S: CanvasSurface> {
    surface: S,
    history: HistoryManager,
    pages: Vec<Page>,
    current_index: usize,

    // Whether pages[current_index]'s content is what the surface shows.
    live: bool,

    page_size: PageSize,
    in_flight: Option<PendingRestore>,
}

impl<S: CanvasSurface> PageManager<S> {
    /// Take over `surface` and open the first page on it.
    pub fn new(surface: S, config: &BoardConfig) -> Result<Self, PageError> {
        let mut manager = Self {
            surface,
            history: HistoryManager::new(),
            pages: Vec::new(),
            current_index: 0,
            live: false,
            page_size: config.page_size(),
            in_flight: None,
        };
        manager.add_page()?;
        Ok(manager)
    }

    /// Append a blank page named after its position and switch to it.
    pub fn add_page(&mut self) -> Result<usize, PageError> {
        self.ensure_idle()?;

        let id = self.pages.len() as u32 + 1;
        self.pages.push(Page::new(id));
        let index = self.pages.len() - 1;
        info!(page_id = id, page_count = self.pages.len(), "page added");

        self.switch_to_page(index)?;
        Ok(index)
    }

    /// Make `index` the live page.
    ///
    /// If the target page cannot be restored the current page is put back on
    /// the surface and stays live.
    pub fn switch_to_page(&mut self, index: usize) -> Result<(), PageError> {
        self.ensure_idle()?;
        self.check_index(index)?;

        self.persist_live()?;
        if let Err(e) = self.materialize(index) {
            warn!(error = %e, page_index = index, "page switch failed, reopening current page");
            self.reload_current();
            return Err(e);
        }

        info!(
            page_index = index,
            page_name = %self.pages[index].name,
            "switched page"
        );
        Ok(())
    }

    pub fn prev_page(&mut self) -> Result<(), PageError> {
        if self.current_index == 0 {
            return Err(PageError::NoPreviousPage);
        }
        self.switch_to_page(self.current_index - 1)
    }

    pub fn next_page(&mut self) -> Result<(), PageError> {
        if self.current_index + 1 >= self.pages.len() {
            return Err(PageError::NoNextPage);
        }
        self.switch_to_page(self.current_index + 1)
    }

    /// Rename a page. Names are trimmed and must be unique (exact match).
    pub fn rename_page(&mut self, index: usize, new_name: &str) -> Result<(), PageError> {
        self.ensure_idle()?;
        self.check_index(index)?;

        let name = new_name.trim();
        if name.is_empty() {
            warn!(page_index = index, "rejected empty page name");
            return Err(PageError::EmptyName);
        }

        let taken = self
            .pages
            .iter()
            .enumerate()
            .any(|(i, page)| i != index && page.name == name);
        if taken {
            warn!(page_index = index, name = %name, "rejected duplicate page name");
            return Err(PageError::DuplicateName {
                name: name.to_string(),
            });
        }

        info!(page_index = index, old = %self.pages[index].name, new = %name, "page renamed");
        self.pages[index].name = name.to_string();
        self.history.record_state(&self.surface)?;
        Ok(())
    }

    /// Delete the current page. The last remaining page cannot be deleted.
    ///
    /// If the page that takes its place cannot be restored, nothing is deleted.
    pub fn delete_page(&mut self) -> Result<(), PageError> {
        self.ensure_idle()?;

        if self.pages.len() <= 1 {
            warn!("refused to delete the last page");
            return Err(PageError::MinimumPageCount);
        }

        self.persist_live()?;
        let previous_pages = self.pages.clone();
        let previous_index = self.current_index;

        let removed = self.pages.remove(self.current_index);
        self.live = false;
        self.current_index = self.current_index.min(self.pages.len() - 1);
        self.renumber();

        info!(
            removed_id = removed.id,
            removed_name = %removed.name,
            page_count = self.pages.len(),
            page_index = self.current_index,
            "page deleted"
        );

        if let Err(e) = self.materialize(self.current_index) {
            warn!(error = %e, "page delete failed, restoring previous pages");
            self.pages = previous_pages;
            self.current_index = previous_index;
            self.reload_current();
            return Err(e);
        }
        Ok(())
    }

    /// Capture the live page, then return every page in order.
    pub fn save_all(&mut self) -> Result<Vec<Page>, PageError> {
        self.ensure_idle()?;
        self.persist_live()?;
        Ok(self.pages.clone())
    }

    /// `save_all` encoded as a page document.
    pub fn save_all_json(&mut self) -> Result<String, PageError> {
        let pages = self.save_all()?;
        encode_pages(&pages)
    }

    /// Replace every page with the decoded document and open its first page.
    ///
    /// Atomic: if the document is malformed or its first page cannot be
    /// restored, the previous pages and live content are put back.
    pub fn load_all(&mut self, json: &str) -> Result<(), PageError> {
        self.ensure_idle()?;
        let pages = decode_pages(json)?;
        self.replace_pages(pages)
    }

    /// Replace every page with already-decoded pages. Same guarantees as `load_all`.
    pub fn replace_pages(&mut self, pages: Vec<Page>) -> Result<(), PageError> {
        self.ensure_idle()?;
        if pages.is_empty() {
            return Err(PageError::Format("document has no pages".into()));
        }

        self.persist_live()?;
        let previous_pages = std::mem::replace(&mut self.pages, pages);
        let previous_index = self.current_index;
        self.live = false;

        match self.materialize(0) {
            Ok(()) => {
                info!(page_count = self.pages.len(), "pages loaded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "page load failed, restoring previous pages");
                self.pages = previous_pages;
                self.current_index = previous_index;
                self.reload_current();
                Err(e)
            }
        }
    }

    /// Legacy import: one snapshot replaces the current page's content.
    pub fn load_single_page(&mut self, json: &str) -> Result<(), PageError> {
        self.ensure_idle()?;

        let previous = self.surface.capture()?;
        let snapshot = Snapshot::from_encoded(json);

        self.surface.clear();
        match self.surface.restore(&snapshot) {
            Ok(outcome) => {
                info!(page_index = self.current_index, "single page loaded");
                self.live = true;
                self.after_restore(outcome, true)
            }
            Err(e) => {
                warn!(error = %e, "single page load failed, keeping current content");
                self.surface.clear();
                match self.surface.restore(&previous) {
                    Ok(outcome) => self.after_restore(outcome, false)?,
                    Err(rollback) => {
                        // Keep the content in the page so a later switch or save still has it.
                        warn!(
                            error = %rollback,
                            page_index = self.current_index,
                            "could not put previous content back"
                        );
                        self.pages[self.current_index].canvas_state = Some(previous);
                        self.live = false;
                    }
                }
                Err(format_error(e))
            }
        }
    }

    /// Legacy export: the current page's live content.
    pub fn export_current_page(&self) -> Result<Snapshot, PageError> {
        self.ensure_idle()?;
        Ok(self.surface.capture()?)
    }

    /// Push the surface's current content onto the history log.
    pub fn record_state(&mut self) -> Result<(), PageError> {
        self.ensure_idle()?;
        self.history.record_state(&self.surface)?;
        Ok(())
    }

    /// Run one user edit against the surface, then record it.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> Result<R, PageError> {
        self.ensure_idle()?;
        let result = f(&mut self.surface);
        self.history.record_state(&self.surface)?;
        Ok(result)
    }

    /// Step the surface back one history entry.
    ///
    /// History holds surface content only. Undoing past a page switch brings
    /// the previous page's content back while `current_index` stays put, and
    /// the next switch stores that content under the current page.
    pub fn undo(&mut self) -> Result<Restore, PageError> {
        self.ensure_idle()?;
        let outcome = self.history.undo(&mut self.surface)?;
        self.after_restore(outcome, false)?;
        Ok(outcome)
    }

    pub fn redo(&mut self) -> Result<Restore, PageError> {
        self.ensure_idle()?;
        let outcome = self.history.redo(&mut self.surface)?;
        self.after_restore(outcome, false)?;
        Ok(outcome)
    }

    /// Check on an asynchronous restore. On completion the latch is released
    /// and any deferred history record happens.
    pub fn poll_restore(&mut self) -> Result<Restore, PageError> {
        let Some(pending) = self.in_flight else {
            return Ok(Restore::Complete);
        };

        match self.surface.poll_restore()? {
            Restore::Pending => Ok(Restore::Pending),
            Restore::Complete => {
                self.in_flight = None;
                debug!(record = pending.record, "restore completed");
                if pending.record {
                    self.history.record_state(&self.surface)?;
                }
                Ok(Restore::Complete)
            }
        }
    }

    pub fn is_restoring(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access for user edits. Call `record_state` afterwards.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.current_index]
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    fn ensure_idle(&self) -> Result<(), PageError> {
        if self.in_flight.is_some() {
            warn!("request refused: restore in flight");
            return Err(PageError::RestoreInFlight);
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), PageError> {
        if index >= self.pages.len() {
            warn!(page_index = index, page_count = self.pages.len(), "invalid page index");
            return Err(PageError::InvalidPageIndex {
                index,
                count: self.pages.len(),
            });
        }
        Ok(())
    }

    /// Store the surface content into the live page's snapshot.
    fn persist_live(&mut self) -> Result<(), PageError> {
        if !self.live {
            return Ok(());
        }
        let snapshot = self.surface.capture()?;
        debug!(page_index = self.current_index, bytes = snapshot.len(), "page persisted");
        self.pages[self.current_index].canvas_state = Some(snapshot);
        Ok(())
    }

    /// Put a page's stored content (or a blank page) on the surface.
    fn show_page(&mut self, index: usize) -> Result<Restore, SurfaceError> {
        self.surface.clear();
        match &self.pages[index].canvas_state {
            Some(snapshot) => self.surface.restore(snapshot),
            None => {
                self.surface.reset_blank(self.page_size);
                Ok(Restore::Complete)
            }
        }
    }

    /// Show `index`, make it current and record history.
    fn materialize(&mut self, index: usize) -> Result<(), PageError> {
        self.live = false;
        let outcome = self.show_page(index).map_err(format_error)?;
        self.current_index = index;
        self.live = true;
        self.after_restore(outcome, true)
    }

    /// Best-effort reload of the current page after a failed load; no history record.
    fn reload_current(&mut self) {
        match self.show_page(self.current_index) {
            Ok(outcome) => {
                self.live = true;
                if outcome.is_pending() {
                    self.in_flight = Some(PendingRestore { record: false });
                }
            }
            Err(e) => {
                warn!(error = %e, page_index = self.current_index, "could not reload page");
                self.live = false;
            }
        }
    }

    fn after_restore(&mut self, outcome: Restore, record: bool) -> Result<(), PageError> {
        match outcome {
            Restore::Complete => {
                if record {
                    self.history.record_state(&self.surface)?;
                }
            }
            Restore::Pending => {
                debug!(record, "restore pending");
                self.in_flight = Some(PendingRestore { record });
            }
        }
        Ok(())
    }

    /// Dense ids from 1. Default names follow their page's new id.
    fn renumber(&mut self) {
        for i in 0..self.pages.len() {
            let old_id = self.pages[i].id;
            let new_id = i as u32 + 1;

            if old_id != new_id && self.pages[i].has_default_name_for(old_id) {
                let new_name = default_page_name(new_id);
                let taken = self
                    .pages
                    .iter()
                    .enumerate()
                    .any(|(j, page)| j != i && page.name == new_name);
                if taken {
                    warn!(page_id = old_id, name = %new_name, "default name taken, keeping old name");
                } else {
                    self.pages[i].name = new_name;
                }
            }

            self.pages[i].id = new_id;
        }
    }
}

/// Undecodable snapshots on a load path are format errors.
fn format_error(e: SurfaceError) -> PageError {
    match e {
        SurfaceError::Decode(msg) => PageError::Format(msg),
        other => PageError::Surface(other),
    }
}
