#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: &str) {
        if entry.trim().is_empty() {
            return;
        }
        self.entries.push(entry.to_owned());
    }

    pub fn recent(&self, count: usize) -> impl Iterator<Item = (usize, &str)> {
        let start = self.entries.len().saturating_sub(count);
        self.entries[start..]
            .iter()
            .enumerate()
            .map(move |(offset, entry)| (start + offset + 1, entry.as_str()))
    }

    pub fn search_prefix(&self, prefix: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .map(String::as_str)
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
