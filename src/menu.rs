use crate::config::Difficulty;
use crate::input::{keys, InputTracker};

/// A list of choices with one of them highlighted. Moving past either end
/// stays on the last item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemList<T> {
    items: Vec<T>,
    index: usize,
}

impl<T: Copy> ItemList<T> {
    pub fn new<I: IntoIterator<Item = T>>(items: I, index: usize) -> Self {
        let items: Vec<T> = items.into_iter().collect();
        assert!(!items.is_empty(), "an item list needs at least one item");
        let index = index.min(items.len() - 1);
        ItemList { items, index }
    }

    pub fn move_forward(&mut self) {
        self.index = usize::min(self.index + 1, self.items.len() - 1);
    }

    pub fn move_back(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn current_item(&self) -> T {
        self.items[self.index]
    }

    pub fn current_index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Start,
    Difficulty,
    Exit,
}

impl MenuEntry {
    fn all() -> [MenuEntry; 3] {
        [MenuEntry::Start, MenuEntry::Difficulty, MenuEntry::Exit]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Focus {
    Entries,
    Difficulty,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MenuAction {
    Start(Difficulty),
    Exit,
}

/// Start / Difficulty / Exit, driven by Up, Down and Return. Choosing
/// Difficulty hands Left and Right over to the difficulty until Return is
/// pressed again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartMenu {
    focus: Focus,
    entries: ItemList<MenuEntry>,
    difficulties: ItemList<Difficulty>,
}

impl StartMenu {
    pub fn new(difficulty: Difficulty) -> Self {
        let all = Difficulty::all();
        let selected = all.iter().position(|&d| d == difficulty).unwrap_or(0);

        StartMenu {
            focus: Focus::Entries,
            entries: ItemList::new(MenuEntry::all(), 0),
            difficulties: ItemList::new(all, selected),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulties.current_item()
    }

    pub fn selected(&self) -> MenuEntry {
        self.entries.current_item()
    }

    /// Applies this tick's key presses.
    pub fn handle(&mut self, input: &InputTracker) -> Option<MenuAction> {
        let confirm = input.key_pressed_now(keys::RETURN);

        match self.focus {
            Focus::Entries => {
                if input.key_pressed_now(keys::UP) {
                    self.entries.move_back();
                }
                if input.key_pressed_now(keys::DOWN) {
                    self.entries.move_forward();
                }
                if !confirm {
                    return None;
                }

                match self.entries.current_item() {
                    MenuEntry::Start => Some(MenuAction::Start(self.difficulty())),
                    MenuEntry::Difficulty => {
                        self.focus = Focus::Difficulty;
                        None
                    }
                    MenuEntry::Exit => Some(MenuAction::Exit),
                }
            }
            Focus::Difficulty => {
                if input.key_pressed_now(keys::LEFT) {
                    self.difficulties.move_back();
                }
                if input.key_pressed_now(keys::RIGHT) {
                    self.difficulties.move_forward();
                }
                if confirm {
                    self.focus = Focus::Entries;
                }
                None
            }
        }
    }

    /// Text of the menu, the highlighted entry wrapped in `> <`.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec!["S N A K E".to_string(), String::new()];

        for (i, entry) in MenuEntry::all().iter().enumerate() {
            let label = match entry {
                MenuEntry::Start => "Start".to_string(),
                MenuEntry::Exit => "Exit".to_string(),
                MenuEntry::Difficulty if self.focus == Focus::Difficulty => {
                    format!("Difficulty: < {} >", self.difficulty())
                }
                MenuEntry::Difficulty => format!("Difficulty: {}", self.difficulty()),
            };

            let highlighted = self.focus == Focus::Entries && i == self.entries.current_index();
            lines.push(if highlighted { format!("> {} <", label) } else { label });
        }

        lines
    }
}
