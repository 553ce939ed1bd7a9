//! The label table shared between the data pass and both code passes.

use super::error::AssembleError;

/// Bounded at 40 entries, matching the reference's fixed-size table.
const MAX_LABELS: usize = 40;

#[derive(Default)]
pub struct Labels {
    entries: Vec<(String, i32)>,
}

impl Labels {
    pub fn new() -> Labels {
        Labels::default()
    }

    pub fn add(&mut self, name: String, addr: i32, pos: usize) -> Result<(), AssembleError> {
        if self.entries.len() >= MAX_LABELS {
            return Err(AssembleError::new(
                format!("Max label count ({}) exceeded", MAX_LABELS),
                pos,
            ));
        }
        self.entries.push((name, addr));
        Ok(())
    }

    /// First-insertion-wins lookup: duplicate labels are permitted, but
    /// only the earliest binding is ever resolved.
    pub fn lookup(&self, name: &str, pos: usize) -> Result<i32, AssembleError> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, addr)| *addr)
            .ok_or_else(|| AssembleError::new(format!("No such label: {}", name), pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insertion_wins() {
        let mut labels = Labels::new();
        labels.add("x".to_string(), 1, 0).unwrap();
        labels.add("x".to_string(), 2, 0).unwrap();
        assert_eq!(labels.lookup("x", 0).unwrap(), 1);
    }

    #[test]
    fn unknown_label_errors() {
        let labels = Labels::new();
        assert!(labels.lookup("nope", 0).is_err());
    }

    #[test]
    fn exceeding_capacity_errors() {
        let mut labels = Labels::new();
        for i in 0..MAX_LABELS {
            labels.add(format!("l{}", i), i as i32, 0).unwrap();
        }
        assert!(labels.add("overflow".to_string(), 0, 0).is_err());
    }
}
