//! Identity-key deduplication.

use std::collections::HashMap;

use tracing::debug;

use crate::models::contact::Contact;

/// Merge records sharing a dedup key.
///
/// The record with the strictly higher score wins and takes the slot of the
/// first record seen with that key; ties keep the earlier record. Records
/// without a key pass through. Returns the survivors and the number of
/// records removed.
pub fn dedupe(contacts: Vec<Contact>) -> (Vec<Contact>, usize) {
    let mut kept: Vec<Contact> = Vec::with_capacity(contacts.len());
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut removed = 0;

    for contact in contacts {
        let Some(key) = contact.dedup_key() else {
            kept.push(contact);
            continue;
        };

        match slots.get(&key) {
            Some(&slot) => {
                removed += 1;
                if contact.confidence_score > kept[slot].confidence_score {
                    debug!(
                        "Replacing duplicate {} ({:.2} -> {:.2})",
                        key, kept[slot].confidence_score, contact.confidence_score
                    );
                    kept[slot] = contact;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(contact);
            }
        }
    }

    (kept, removed)
}
