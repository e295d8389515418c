use crate::error::{ReactionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NEUTRON: &str = "n";
pub const PHOTON: &str = "photon";
pub const ELECTRON: &str = "e-";

/// Electron rest mass energy in MeV.
pub const ELECTRON_MASS_MEV: f64 = 0.510_998_946_1;

/// Multi-group energy structure: `boundaries.len() - 1` groups in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiGroup {
    pub label: String,
    pub boundaries: Vec<f64>,
}

impl MultiGroup {
    pub fn new(label: &str, boundaries: Vec<f64>) -> Self {
        MultiGroup {
            label: label.to_string(),
            boundaries,
        }
    }

    pub fn number_of_groups(&self) -> usize {
        self.boundaries.len().saturating_sub(1)
    }

    /// Index of the group containing `energy`.
    ///
    /// Group `i` spans `[boundaries[i], boundaries[i + 1])`; the top boundary
    /// itself belongs to the last group. Energies outside the structure map
    /// to the nearest group when `enclose_out_of_range` is set and to `None`
    /// otherwise.
    pub fn multi_group_index_from_energy(
        &self,
        energy: f64,
        enclose_out_of_range: bool,
    ) -> Option<usize> {
        let groups = self.number_of_groups();
        if groups == 0 {
            return None;
        }
        let lowest = self.boundaries[0];
        let highest = self.boundaries[groups];

        if energy < lowest {
            return enclose_out_of_range.then_some(0);
        }
        if energy > highest {
            return enclose_out_of_range.then_some(groups - 1);
        }
        if energy == highest {
            return Some(groups - 1);
        }
        Some(self.boundaries.partition_point(|&b| b <= energy) - 1)
    }
}

/// A particle the transport solver tracks, with its group structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: String,
    pub multi_group: MultiGroup,
}

impl Particle {
    pub fn new(id: &str, multi_group: MultiGroup) -> Self {
        Particle {
            id: id.to_string(),
            multi_group,
        }
    }
}

/// The set of transportable particles, keyed (and iterated) by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Particles {
    particles: BTreeMap<String, Particle>,
}

impl Particles {
    pub fn new() -> Self {
        Particles::default()
    }

    pub fn add(&mut self, particle: Particle) {
        self.particles.insert(particle.id.clone(), particle);
    }

    pub fn with(mut self, particle: Particle) -> Self {
        self.add(particle);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Particle> {
        self.particles.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.particles.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.particles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.values()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn multi_group(&self, id: &str) -> Result<&MultiGroup> {
        self.get(id)
            .map(|particle| &particle.multi_group)
            .ok_or_else(|| ReactionError::MissingParticle(id.to_string()))
    }
}

/// Selects which multi-group data a query reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiGroupSettings {
    /// Label of the multi-group style, e.g. "MultiGroup_1".
    pub label: String,
    /// Include delayed fission neutrons in neutron quantities.
    pub delayed_neutrons: bool,
}

impl MultiGroupSettings {
    pub fn new(label: &str) -> Self {
        MultiGroupSettings {
            label: label.to_string(),
            delayed_neutrons: false,
        }
    }

    pub fn with_delayed_neutrons(mut self, delayed_neutrons: bool) -> Self {
        self.delayed_neutrons = delayed_neutrons;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photon_groups() -> MultiGroup {
        MultiGroup::new("LLNL_gid_70", vec![0.0, 0.1, 0.5, 1.0, 10.0])
    }

    #[test]
    fn test_index_inside() {
        let mg = photon_groups();
        assert_eq!(mg.number_of_groups(), 4);
        assert_eq!(mg.multi_group_index_from_energy(0.0, false), Some(0));
        assert_eq!(mg.multi_group_index_from_energy(0.05, false), Some(0));
        assert_eq!(mg.multi_group_index_from_energy(0.1, false), Some(1));
        assert_eq!(mg.multi_group_index_from_energy(ELECTRON_MASS_MEV, false), Some(2));
        assert_eq!(mg.multi_group_index_from_energy(10.0, false), Some(3));
    }

    #[test]
    fn test_index_out_of_range() {
        let mg = MultiGroup::new("coarse", vec![1.0, 2.0, 3.0]);
        assert_eq!(mg.multi_group_index_from_energy(0.5, false), None);
        assert_eq!(mg.multi_group_index_from_energy(0.5, true), Some(0));
        assert_eq!(mg.multi_group_index_from_energy(4.0, false), None);
        assert_eq!(mg.multi_group_index_from_energy(4.0, true), Some(1));
    }

    #[test]
    fn test_degenerate_structure() {
        let mg = MultiGroup::new("empty", vec![1.0]);
        assert_eq!(mg.multi_group_index_from_energy(1.0, true), None);
    }

    #[test]
    fn test_particles_ordered_by_id() {
        let particles = Particles::new()
            .with(Particle::new(PHOTON, photon_groups()))
            .with(Particle::new(NEUTRON, photon_groups()));
        let ids: Vec<&str> = particles.ids().collect();
        assert_eq!(ids, vec![NEUTRON, PHOTON]);
        assert!(particles.multi_group("H1").is_err());
        assert_eq!(particles.multi_group(PHOTON).unwrap().label, "LLNL_gid_70");
    }
}
