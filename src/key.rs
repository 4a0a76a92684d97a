//! Field keys and key paths.

use std::fmt;

/// Identifier of a value inside a container.
///
/// Field-indexed containers use the integer form as the byte offset of the value within
/// their region; a key without one cannot address anything there.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Name only.
    Name(String),
    /// Bare integer key.
    Int(usize),
    /// Named field bound to an integer key.
    Field(String, usize),
    /// Synthetic position marker recorded in key paths.
    Index(usize),
}

impl Key {
    pub fn int_value(&self) -> Option<usize> {
        match self {
            Key::Name(_) => None,
            Key::Int(i) | Key::Field(_, i) | Key::Index(i) => Some(*i),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) | Key::Field(name, _) => f.write_str(name),
            Key::Int(i) => write!(f, "{}", i),
            Key::Index(i) => write!(f, "Index {}", i),
        }
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Int(i)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<(&str, usize)> for Key {
    fn from((name, i): (&str, usize)) -> Self {
        Key::Field(name.to_string(), i)
    }
}

/// Keys leading from the root value to the current decode, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath(Vec<Key>);

impl KeyPath {
    pub fn new() -> Self {
        KeyPath::default()
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A copy of this path extended by `key`.
    pub fn child(&self, key: Key) -> KeyPath {
        let mut keys = self.0.clone();
        keys.push(key);
        KeyPath(keys)
    }
}

impl From<Vec<Key>> for KeyPath {
    fn from(keys: Vec<Key>) -> Self {
        KeyPath(keys)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}
