use log::info;

use super::RsaEngine;
use crate::instance::{DemandId, Instance};

impl RsaEngine {
    /// Marks the arc behind `var_id` as occupied by `occupant` in the
    /// solver's solution. ** Panics on an unassigned variable id **
    pub fn mark_on_path(&mut self, var_id: u32, occupant: DemandId) {
        let (d, a) = self.var_table[var_id as usize];
        self.graphs[d].arc_mut(a).on_path = Some(occupant);
    }

    pub fn clear_on_path(&mut self, var_id: u32) {
        let (d, a) = self.var_table[var_id as usize];
        self.graphs[d].arc_mut(a).on_path = None;
    }

    /// Writes every marked arc into the shared slot occupancy and advances
    /// the batch cursor. This is the only instance mutation of the round;
    /// nothing here may run concurrently with graph construction or pruning
    /// of a later round.
    pub fn commit(&self, instance: &mut Instance) {
        let mut committed = 0u32;
        for graph in &self.graphs {
            for (_, arc) in graph.arcs() {
                if let Some(occupant) = arc.on_path {
                    instance.assign_slices(arc.link, arc.slice, occupant);
                    committed += 1;
                }
            }
        }

        let mut next_start = instance.next_demand_index() + self.demands.len();
        if instance.input().blocking_allowed {
            if instance.was_blocked() {
                // skip the blocked demand; a later recovery round picks it up
                next_start += 1;
            }
            let configured = instance.input().demands_at_once;
            instance.set_demands_at_once(configured);
        } else if instance.was_blocked() {
            // an empty batch signals the surrounding scheduler to recover
            instance.set_demands_at_once(0);
        }
        instance.set_next_demand_index(next_start);

        info!(
            "committed {committed} arcs, cursor advanced to demand index {next_start}"
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        instance::{Demand, Input},
        testing::{ring_instance, unit_demand},
    };

    fn batch_of_eight(blocking_allowed: bool) -> Instance {
        let demands: Vec<Demand> = (0..8).map(|id| unit_demand(id, 0, 2, 3.0)).collect();
        let mut input = Input::default();
        input.demands_at_once = 8;
        input.blocking_allowed = blocking_allowed;
        ring_instance(4, 4, demands, input)
    }

    #[test]
    fn selected_arcs_become_slot_assignments() {
        let mut instance = batch_of_eight(false);
        let mut engine = RsaEngine::new(&instance);

        let selected = engine
            .variables()
            .find(|v| v.link == 2 && v.slice == 1)
            .unwrap();
        engine.mark_on_path(selected.var_id, 7);
        engine.commit(&mut instance);

        assert_eq!(instance.fiber(2).assignment(1), Some(7));
        assert!(!instance.fiber(2).is_slice_used(0));
        assert!(!instance.fiber(1).is_slice_used(1));
        // no block recorded: the batch size stays as configured
        assert_eq!(instance.demands_at_once(), 8);
        assert_eq!(instance.next_demand_index(), 8);
    }

    #[test]
    fn commit_writes_whole_blocks_for_wide_loads() {
        let mut wide = unit_demand(0, 0, 2, 3.0);
        wide.load = 3;
        let mut input = Input::default();
        input.demands_at_once = 1;
        let mut instance = ring_instance(4, 4, vec![wide], input);
        let mut engine = RsaEngine::new(&instance);

        let selected = engine
            .variables()
            .find(|v| v.link == 0 && v.slice == 3)
            .unwrap();
        engine.mark_on_path(selected.var_id, 0);
        engine.commit(&mut instance);

        for slice in 1..=3 {
            assert_eq!(instance.fiber(0).assignment(slice), Some(0));
        }
        assert!(!instance.fiber(0).is_slice_used(0));
    }

    #[test]
    fn cursor_with_blocking_allowed() {
        let mut instance = batch_of_eight(true);
        let engine = RsaEngine::new(&instance);

        instance.record_blocking();
        instance.set_demands_at_once(3);
        engine.commit(&mut instance);

        // one extra position past the blocked demand, batch size restored
        assert_eq!(instance.next_demand_index(), 9);
        assert_eq!(instance.demands_at_once(), 8);
    }

    #[test]
    fn cursor_with_blocking_disallowed() {
        let mut instance = batch_of_eight(false);
        let engine = RsaEngine::new(&instance);

        instance.record_blocking();
        engine.commit(&mut instance);

        // a disallowed block forces an empty next round
        assert_eq!(instance.next_demand_index(), 8);
        assert_eq!(instance.demands_at_once(), 0);
    }

    #[test]
    fn unmarking_reverts_a_selection() {
        let mut instance = batch_of_eight(false);
        let mut engine = RsaEngine::new(&instance);

        let selected = engine
            .variables()
            .find(|v| v.link == 2 && v.slice == 1)
            .unwrap();
        engine.mark_on_path(selected.var_id, 7);
        engine.clear_on_path(selected.var_id);
        engine.commit(&mut instance);

        assert!(!instance.fiber(2).is_slice_used(1));
    }
}
