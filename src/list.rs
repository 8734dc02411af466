//! An append-only list of incidents with a read cursor.
//!
//! The list is deliberately not built on [`std::slice::Iter`]: consumers
//! read through the cursor while the owning client keeps appending newly
//! fetched pages, and an index into a growable `Vec` stays valid across
//! appends. The backing store only ever grows; records are never removed
//! or reordered, so the cursor never needs adjusting.

use crate::error::{Result, UshahidiError};
use crate::model::Incident;

/// Incidents in append order plus a cursor marking the next unread one.
#[derive(Debug, Clone, Default)]
pub struct IncidentList {
    incidents: Vec<Incident>,
    cursor: usize,
}

impl IncidentList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an incident at the end. No uniqueness check is done here.
    pub fn append(&mut self, incident: Incident) {
        self.incidents.push(incident);
    }

    /// Whether an unread incident remains.
    pub fn has_next(&self) -> bool {
        self.cursor < self.incidents.len()
    }

    /// Return the incident under the cursor and advance past it.
    pub fn next(&mut self) -> Result<Incident> {
        let incident = self
            .incidents
            .get(self.cursor)
            .cloned()
            .ok_or(UshahidiError::Exhausted)?;
        self.cursor += 1;
        Ok(incident)
    }

    /// Move the cursor past unread incidents that do not satisfy `pred`.
    ///
    /// Stops on the first match (leaving it unread) or at the end.
    pub fn skip_unmatched<P>(&mut self, pred: &P)
    where
        P: Fn(&Incident) -> bool + ?Sized,
    {
        while let Some(incident) = self.incidents.get(self.cursor) {
            if pred(incident) {
                break;
            }
            self.cursor += 1;
        }
    }

    /// A copy of every incident ever appended, in append order.
    pub fn all(&self) -> Vec<Incident> {
        self.incidents.clone()
    }

    /// Borrowed view of every incident, in append order.
    pub fn as_slice(&self) -> &[Incident] {
        &self.incidents
    }

    /// Number of incidents appended so far.
    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    /// Whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Index of the next unread incident.
    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl From<Vec<Incident>> for IncidentList {
    fn from(incidents: Vec<Incident>) -> Self {
        Self {
            incidents,
            cursor: 0,
        }
    }
}

impl FromIterator<Incident> for IncidentList {
    fn from_iter<I: IntoIterator<Item = Incident>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Appends in iteration order, like repeated [`IncidentList::append`].
impl Extend<Incident> for IncidentList {
    fn extend<I: IntoIterator<Item = Incident>>(&mut self, iter: I) {
        self.incidents.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(id: i64) -> Incident {
        Incident::new(id, &format!("Incident {id}"))
    }

    #[test]
    fn test_next_on_empty_list_is_exhausted() {
        let mut list = IncidentList::new();
        assert!(!list.has_next());
        assert!(matches!(list.next(), Err(UshahidiError::Exhausted)));
        assert_eq!(list.position(), 0);
    }

    #[test]
    fn test_next_follows_append_order_not_id_order() {
        let mut list: IncidentList = [incident(30), incident(10), incident(20)]
            .into_iter()
            .collect();

        let ids: Vec<i64> = std::iter::from_fn(|| list.next().ok())
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[test]
    fn test_append_while_iterating() {
        let mut list = IncidentList::new();
        list.append(incident(1));
        assert_eq!(list.next().unwrap().id, 1);
        assert!(!list.has_next());

        // Appending after exhaustion makes the new record readable.
        list.append(incident(2));
        list.append(incident(3));
        assert!(list.has_next());
        assert_eq!(list.next().unwrap().id, 2);

        list.append(incident(4));
        assert_eq!(list.next().unwrap().id, 3);
        assert_eq!(list.next().unwrap().id, 4);
        assert!(matches!(list.next(), Err(UshahidiError::Exhausted)));
    }

    #[test]
    fn test_interleaved_appends_never_repeat_a_slot() {
        let mut list = IncidentList::new();
        let mut seen = Vec::new();

        for round in 0..5 {
            for k in 0..round {
                list.append(incident(round * 10 + k));
            }
            if list.has_next() {
                seen.push(list.next().unwrap().id);
            }
        }
        while list.has_next() {
            seen.push(list.next().unwrap().id);
        }

        let appended: Vec<i64> = list.as_slice().iter().map(|i| i.id).collect();
        assert_eq!(seen, appended);
    }

    #[test]
    fn test_all_ignores_cursor() {
        let mut list: IncidentList = vec![incident(1), incident(2)].into();
        list.next().unwrap();

        let all = list.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 1);
        assert_eq!(list.position(), 1);
    }

    #[test]
    fn test_extend_appends_behind_the_cursor() {
        let mut list: IncidentList = vec![incident(1), incident(2)].into();
        assert_eq!(list.next().unwrap().id, 1);

        list.extend([incident(3), incident(4)]);
        assert_eq!(list.len(), 4);
        assert_eq!(list.position(), 1);

        let rest: Vec<i64> = std::iter::from_fn(|| list.next().ok())
            .map(|i| i.id)
            .collect();
        assert_eq!(rest, vec![2, 3, 4]);
    }

    #[test]
    fn test_skip_unmatched_stops_on_match() {
        let mut list: IncidentList = (1..=6).map(incident).collect();

        list.skip_unmatched(&|i: &Incident| i.id % 3 == 0);
        assert_eq!(list.position(), 2);
        assert_eq!(list.next().unwrap().id, 3);

        list.skip_unmatched(&|i: &Incident| i.id > 10);
        assert!(!list.has_next());
        assert_eq!(list.position(), 6);
    }
}
