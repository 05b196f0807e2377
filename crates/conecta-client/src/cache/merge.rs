//! List merge primitives used by realtime callbacks and mutation handlers.
//!
//! Realtime inserts can race the initial list fetch and the server may echo a
//! row the sender already patched in, so every merge is keyed: an existing
//! entry is replaced in place, a new one is appended. Applying the same event
//! twice leaves the list unchanged.

use uuid::Uuid;

/// Replace the entry with the same key in place, or append
pub fn upsert_by<T, K, F>(list: &mut Vec<T>, row: T, key_of: F)
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let key = key_of(&row);
    if let Some(existing) = list.iter_mut().find(|item| key_of(item) == key) {
        *existing = row;
    } else {
        list.push(row);
    }
}

/// Merge keyed by primary id
pub fn merge_by_id<T, F>(list: &mut Vec<T>, row: T, id_of: F)
where
    F: Fn(&T) -> Uuid,
{
    upsert_by(list, row, id_of);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: Uuid,
        body: String,
    }

    #[test]
    fn same_insert_applied_twice_does_not_duplicate() {
        let id = Uuid::new_v4();
        let row = Row {
            id,
            body: "Bom dia!".into(),
        };

        let mut list = Vec::new();
        merge_by_id(&mut list, row.clone(), |r| r.id);
        merge_by_id(&mut list, row.clone(), |r| r.id);

        assert_eq!(list, vec![row]);
    }

    #[test]
    fn existing_id_is_replaced_in_place() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut list = vec![
            Row {
                id: first,
                body: "a".into(),
            },
            Row {
                id: second,
                body: "b".into(),
            },
        ];

        merge_by_id(
            &mut list,
            Row {
                id: first,
                body: "editada".into(),
            },
            |r| r.id,
        );

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].body, "editada");
        assert_eq!(list[1].id, second);
    }

    #[test]
    fn rsvp_upsert_keeps_one_row_with_latest_status() {
        #[derive(Debug, Clone)]
        struct Rsvp {
            event_id: Uuid,
            user_id: Uuid,
            status: &'static str,
        }

        let event = Uuid::new_v4();
        let user = Uuid::new_v4();
        let mut list = Vec::new();

        upsert_by(
            &mut list,
            Rsvp {
                event_id: event,
                user_id: user,
                status: "CONFIRMED",
            },
            |r| (r.event_id, r.user_id),
        );
        upsert_by(
            &mut list,
            Rsvp {
                event_id: event,
                user_id: user,
                status: "DECLINED",
            },
            |r| (r.event_id, r.user_id),
        );

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, "DECLINED");
    }
}
