//! Natural ("human") ordering of file names.
//!
//! Digit runs compare by numeric value, so `Slide 2` sorts before
//! `Slide 10`. Everything else compares case-insensitively. Two names that
//! only differ in case or in leading zeros compare [`Equal`](Ordering::Equal),
//! leaving their relative order to the (stable) sort.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

/// Splits a string into alternating runs of ASCII digits and everything else.
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self.rest.find(|c: char| c.is_ascii_digit() != digits).unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if digits { Chunk::Digits(chunk) } else { Chunk::Text(chunk) })
    }
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    // Same number of significant digits means a plain string compare is numeric.
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars().flat_map(char::to_lowercase).cmp(b.chars().flat_map(char::to_lowercase))
}

/// Where a digit run sits relative to `text`: after whitespace and
/// punctuation, before letters.
fn digits_against(text: &str) -> Ordering {
    match text.chars().next() {
        Some(c) if c.is_alphabetic() => Ordering::Less,
        _ => Ordering::Greater,
    }
}

/// Compare two names in natural order.
///
/// # Examples
///
/// ```
/// use slidepack_collection::natural::natural_cmp;
/// use std::cmp::Ordering;
///
/// assert_eq!(natural_cmp("Slide 2", "Slide 10"), Ordering::Less);
/// assert_eq!(natural_cmp("slide 1", "Slide 01"), Ordering::Equal);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks { rest: a };
    let mut right = Chunks { rest: b };
    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(Chunk::Digits(x)), Some(Chunk::Digits(y))) => compare_digits(x, y),
            (Some(Chunk::Text(x)), Some(Chunk::Text(y))) => compare_text(x, y),
            (Some(Chunk::Digits(_)), Some(Chunk::Text(y))) => digits_against(y),
            (Some(Chunk::Text(x)), Some(Chunk::Digits(_))) => digits_against(x).reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}
