//! Maps surviving tubes back to their item ids.

use serde::Serialize;
use tracing::{debug, warn};

use spindle_core::{Batch, Item};

/// A finished tube, tagged with the id of the item it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelabeledTube {
    pub short_id: u32,
    pub item_id: String,
}

/// Relabel every tube in `batches`, preserving batch and tube order.
pub fn relabel_tubes(batches: &[Batch], items: &[Item]) -> Vec<RelabeledTube> {
    let relabeled: Vec<RelabeledTube> = batches
        .iter()
        .flat_map(|b| b.tubes.iter())
        .filter_map(|tube| {
            let item = (tube.short_id as usize)
                .checked_sub(1)
                .and_then(|i| items.get(i));
            match item {
                Some(item) => Some(RelabeledTube {
                    short_id: tube.short_id,
                    item_id: item.id.clone(),
                }),
                None => {
                    warn!(short_id = tube.short_id, "tube has no originating item");
                    None
                }
            }
        })
        .collect();

    debug!(tubes = relabeled.len(), "relabeled tubes");
    relabeled
}

#[cfg(test)]
mod tests {
    use spindle_core::{Marker, Tube};

    use super::*;

    #[test]
    fn maps_short_ids_to_item_ids() {
        let items = vec![Item::new("1042"), Item::new("1043")];
        let batches = vec![
            Batch::new(Marker::for_index(0), vec![Tube::new(1), Tube::new(2)]),
            Batch::new(Marker::for_index(1), vec![Tube::new(2)]),
        ];
        let tubes = relabel_tubes(&batches, &items);
        let ids: Vec<&str> = tubes.iter().map(|t| t.item_id.as_str()).collect();
        assert_eq!(ids, vec!["1042", "1043", "1043"]);
        assert_eq!(tubes[0].short_id, 1);
    }

    #[test]
    fn skips_unknown_short_ids() {
        let items = vec![Item::new("1042")];
        let batches = vec![Batch::new(
            Marker::for_index(0),
            vec![Tube::new(0), Tube::new(1), Tube::new(5)],
        )];
        let tubes = relabel_tubes(&batches, &items);
        assert_eq!(tubes.len(), 1);
        assert_eq!(tubes[0].item_id, "1042");
    }
}
