//! Paginated walk over an object store.

use crate::store::{ListEntry, ListRequest, ObjectStore, StoreError};

/// Lazily requests listing pages until the store reports no continuation.
///
/// Pages are fetched one at a time on demand; a failed request ends the walk
/// and leaves the lister exhausted.
pub struct Lister<'a> {
    store: &'a dyn ObjectStore,
    start_after: Option<String>,
    continuation: Option<String>,
    page_size: usize,
    pages: usize,
    done: bool,
}

impl<'a> Lister<'a> {
    pub fn new(store: &'a dyn ObjectStore, start_after: Option<String>, page_size: usize) -> Self {
        Self {
            store,
            start_after,
            continuation: None,
            page_size: page_size.max(1),
            pages: 0,
            done: false,
        }
    }

    /// Next page of entries, or `None` once every page has been returned.
    pub async fn next_page(&mut self) -> Result<Option<Vec<ListEntry>>, StoreError> {
        if self.done {
            return Ok(None);
        }

        let request = ListRequest {
            start_after: self.start_after.clone(),
            continuation: self.continuation.take(),
            max_keys: self.page_size,
        };

        let page = match self.store.list_page(request).await {
            Ok(page) => page,
            Err(err) => {
                self.done = true;
                return Err(err);
            }
        };

        self.pages += 1;
        self.done = !page.has_more();
        self.continuation = page.next_continuation;
        Ok(Some(page.entries))
    }

    /// Pages returned so far.
    pub fn pages(&self) -> usize {
        self.pages
    }
}
