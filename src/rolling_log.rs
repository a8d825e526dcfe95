/// Bounded message log: pushing past the cap drops the oldest entries.
#[derive(Clone, Debug, PartialEq)]
pub struct RollingLog {
    entries: Vec<String>,
    cap: usize,
}

impl RollingLog {
    pub fn new(cap: usize) -> Self {
        Self { entries: Vec::new(), cap }
    }

    /// Start with `lines` already present (still subject to the cap).
    pub fn with_lines(cap: usize, lines: &[&str]) -> Self {
        let mut log = Self::new(cap);
        for line in lines {
            log.push(*line);
        }
        log
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
        if self.entries.len() > self.cap {
            let excess = self.entries.len() - self.cap;
            self.entries.drain(..excess);
        }
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines joined for a multi-line text node.
    pub fn joined(&self) -> String {
        self.entries.join("\n")
    }
}
