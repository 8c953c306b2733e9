use crate::tui::components::{InputField, SelectList};
use crate::tui::events::AppEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;
use vidshelf::Error;
use vidshelf::core::{Collection, CollectionId, FileGateway, OwnerView, PinSync, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Pinned,
    Recent,
    All,
}

impl Pane {
    fn next(self) -> Self {
        match self {
            Pane::Pinned => Pane::Recent,
            Pane::Recent => Pane::All,
            Pane::All => Pane::Pinned,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browse,
    NewCollection,
    /// The pin limit was hit; the user picks a pinned collection to evict.
    ChooseEviction {
        incoming: CollectionId,
        name: String,
    },
}

/// Results reported back by background tasks.
#[derive(Debug)]
pub enum SyncEvent {
    Settled(String),
    Failed(String),
    LimitReached { incoming: CollectionId, name: String },
    Collections(Vec<Collection>),
}

pub struct App {
    pub mode: Mode,
    pub focus: Pane,
    pub should_quit: bool,
    pub status: String,

    pub pinned_list: SelectList,
    pub recent_list: SelectList,
    pub all_list: SelectList,
    pub name_input: InputField,

    pub view: OwnerView,
    pub collections: Vec<Collection>,

    sync: Arc<PinSync<FileGateway>>,
    owner: UserId,
    tx: mpsc::UnboundedSender<SyncEvent>,
    rx: mpsc::UnboundedReceiver<SyncEvent>,
}

impl App {
    pub fn new(sync: Arc<PinSync<FileGateway>>, owner: UserId) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            mode: Mode::Browse,
            focus: Pane::Pinned,
            should_quit: false,
            status: format!("Signed in as {owner}"),

            pinned_list: SelectList::new(),
            recent_list: SelectList::new(),
            all_list: SelectList::new(),
            name_input: InputField::new("New collection", "Collection name..."),

            view: OwnerView::default(),
            collections: Vec::new(),

            sync,
            owner,
            tx,
            rx,
        }
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => {}
        }
        self.drain_events();
        self.sync_lists();
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.mode.clone() {
            Mode::Browse => self.handle_browse_key(key),
            Mode::NewCollection => self.handle_new_collection_key(key),
            Mode::ChooseEviction { incoming, name } => {
                self.handle_eviction_key(key, incoming, name)
            }
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        let shifted = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Up if shifted => self.move_selected_pin(-1),
            KeyCode::Down if shifted => self.move_selected_pin(1),
            KeyCode::Char('K') => self.move_selected_pin(-1),
            KeyCode::Char('J') => self.move_selected_pin(1),
            KeyCode::Char('p') => {
                if let Some(c) = self.selected_collection() {
                    self.pin(c.id, c.name);
                }
            }
            KeyCode::Char('u') => {
                if let Some(c) = self.selected_collection() {
                    self.unpin(c.id, c.name);
                }
            }
            KeyCode::Char('d') if self.focus == Pane::All => {
                if let Some(c) = self.selected_collection() {
                    self.delete(c.id, c.name);
                }
            }
            KeyCode::Enter => {
                if let Some(c) = self.selected_collection() {
                    self.open(c.id, c.name);
                }
            }
            KeyCode::Char('n') => {
                self.name_input.clear();
                self.mode = Mode::NewCollection;
            }
            KeyCode::Char('r') => self.reload(),
            _ => {
                self.focused_list().handle_key(key);
            }
        }
    }

    fn handle_new_collection_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Enter => {
                if self.name_input.is_valid() {
                    let name = self.name_input.value.trim().to_string();
                    self.create(name);
                    self.mode = Mode::Browse;
                }
            }
            _ => {
                self.name_input.handle_key(key);
            }
        }
    }

    fn handle_eviction_key(&mut self, key: KeyEvent, incoming: CollectionId, name: String) {
        match key.code {
            KeyCode::Esc => {
                self.status = format!("Kept current pins; {name} was not pinned");
                self.mode = Mode::Browse;
            }
            KeyCode::Enter => {
                if let Some(evicted) = self
                    .pinned_list
                    .selected()
                    .and_then(|i| self.view.pinned.get(i))
                {
                    let old = evicted.collection_id().clone();
                    let old_name = evicted.name().to_string();
                    self.replace(old, old_name, incoming, name);
                    self.mode = Mode::Browse;
                }
            }
            _ => {
                self.pinned_list.handle_key(key);
            }
        }
    }

    fn focused_list(&mut self) -> &mut SelectList {
        match self.focus {
            Pane::Pinned => &mut self.pinned_list,
            Pane::Recent => &mut self.recent_list,
            Pane::All => &mut self.all_list,
        }
    }

    /// Id and name of the row under the cursor in the focused pane.
    fn selected_collection(&self) -> Option<Collection> {
        match self.focus {
            Pane::Pinned => self.pinned_list.selected().and_then(|i| {
                let pinned = self.view.pinned.get(i)?;
                pinned.collection.clone().or_else(|| {
                    self.collections
                        .iter()
                        .find(|c| &c.id == pinned.collection_id())
                        .cloned()
                })
            }),
            Pane::Recent => self
                .recent_list
                .selected()
                .and_then(|i| self.view.recent.get(i).cloned()),
            Pane::All => self
                .all_list
                .selected()
                .and_then(|i| self.collections.get(i).cloned()),
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                SyncEvent::Settled(message) | SyncEvent::Failed(message) => self.status = message,
                SyncEvent::LimitReached { incoming, name } => {
                    self.status = format!("Pin limit reached: choose a pin to replace with {name}");
                    self.focus = Pane::Pinned;
                    self.mode = Mode::ChooseEviction { incoming, name };
                }
                SyncEvent::Collections(collections) => self.collections = collections,
            }
        }
    }

    /// Rebuild the rendered rows from the sync layer's current view.
    fn sync_lists(&mut self) {
        self.view = self.sync.view(&self.owner);

        let pinned_rows = self
            .view
            .pinned
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let marker = if self.sync.is_syncing(&self.owner, p.collection_id()) {
                    " ⟳"
                } else {
                    ""
                };
                format!("{}. {}{marker}", i + 1, p.name())
            })
            .collect();
        self.pinned_list.update_items(pinned_rows);

        let recent_rows = self
            .view
            .recent
            .iter()
            .map(|c| match c.last_accessed_at {
                Some(at) => format!("{}  ({})", c.name, at.format("%Y-%m-%d %H:%M")),
                None => c.name.clone(),
            })
            .collect();
        self.recent_list.update_items(recent_rows);

        let all_rows = self
            .collections
            .iter()
            .map(|c| {
                let pinned = self.sync.is_pinned(&self.owner, &c.id);
                format!("{} {}", if pinned { "📌" } else { "  " }, c.name)
            })
            .collect();
        self.all_list.update_items(all_rows);
    }

    fn spawn<F>(&self, task: impl FnOnce(Arc<PinSync<FileGateway>>, UserId) -> F)
    where
        F: Future<Output = SyncEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        let fut = task(self.sync.clone(), self.owner.clone());
        tokio::spawn(async move {
            let _ = tx.send(fut.await);
        });
    }

    pub fn reload(&mut self) {
        self.status = "Refreshing...".to_string();
        self.spawn(|sync, owner| async move {
            if let Err(err) = sync.refresh(&owner).await {
                return SyncEvent::Failed(format!("Refresh failed: {err}"));
            }
            match sync.gateway().list_collections(&owner).await {
                Ok(collections) => SyncEvent::Collections(collections),
                Err(err) => SyncEvent::Failed(format!("Could not list collections: {err}")),
            }
        });
    }

    fn pin(&mut self, id: CollectionId, name: String) {
        self.spawn(|sync, owner| async move {
            let result = sync.pin(&owner, &id).await;
            match result {
                Ok(()) => SyncEvent::Settled(format!("Pinned {name}")),
                Err(err) if err.is_pin_limit() => SyncEvent::LimitReached { incoming: id, name },
                Err(err) => SyncEvent::Failed(format!("Could not pin {name}: {err}")),
            }
        });
    }

    fn unpin(&mut self, id: CollectionId, name: String) {
        self.spawn(|sync, owner| async move {
            match sync.unpin(&owner, &id).await {
                Ok(()) => SyncEvent::Settled(format!("Unpinned {name}")),
                Err(err) => SyncEvent::Failed(format!("Could not unpin {name}: {err}")),
            }
        });
    }

    fn replace(&mut self, old: CollectionId, old_name: String, new: CollectionId, name: String) {
        self.spawn(|sync, owner| async move {
            match sync.replace(&owner, &old, &new).await {
                Ok(()) => SyncEvent::Settled(format!("Replaced {old_name} with {name}")),
                Err(err) => SyncEvent::Failed(format!("Could not replace {old_name}: {err}")),
            }
        });
    }

    fn move_selected_pin(&mut self, delta: isize) {
        if self.focus != Pane::Pinned {
            return;
        }
        let Some(from) = self.pinned_list.selected() else {
            return;
        };
        let to = from.saturating_add_signed(delta);
        if to == from || to >= self.view.pinned.len() {
            return;
        }
        self.pinned_list.select(to);
        self.spawn(move |sync, owner| async move {
            match sync.move_pin(&owner, from, to).await {
                Ok(()) => SyncEvent::Settled("Pins reordered".to_string()),
                Err(Error::SyncInProgress { .. }) => {
                    SyncEvent::Failed("Still syncing; try again in a moment".to_string())
                }
                Err(err) => SyncEvent::Failed(format!("Reorder failed: {err}")),
            }
        });
    }

    fn open(&mut self, id: CollectionId, name: String) {
        self.spawn(|sync, owner| async move {
            sync.recency().touch(&owner, &id).await;
            match sync.gateway().list_videos(&owner, &id).await {
                Ok(videos) => SyncEvent::Settled(format!("Opened {name}: {} videos", videos.len())),
                Err(err) => SyncEvent::Failed(format!("Could not open {name}: {err}")),
            }
        });
    }

    fn create(&mut self, name: String) {
        self.spawn(|sync, owner| async move {
            if let Err(err) = sync.gateway().create_collection(&owner, &name, None).await {
                return SyncEvent::Failed(format!("Could not create {name}: {err}"));
            }
            match sync.gateway().list_collections(&owner).await {
                Ok(collections) => SyncEvent::Collections(collections),
                Err(err) => SyncEvent::Failed(format!("Could not list collections: {err}")),
            }
        });
    }

    fn delete(&mut self, id: CollectionId, name: String) {
        self.spawn(|sync, owner| async move {
            if let Err(err) = sync.gateway().delete_collection(&owner, &id).await {
                return SyncEvent::Failed(format!("Could not delete {name}: {err}"));
            }
            if let Err(err) = sync.refresh(&owner).await {
                return SyncEvent::Failed(format!("Refresh failed: {err}"));
            }
            match sync.gateway().list_collections(&owner).await {
                Ok(collections) => SyncEvent::Collections(collections),
                Err(err) => SyncEvent::Failed(format!("Could not list collections: {err}")),
            }
        });
    }
}
