use super::*;

/// Uniform mine placement: every layout with the requested mine count is
/// equally likely.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> Minefield {
        use rand::prelude::*;

        let total_cells = config.total_cells();

        // optimize for full boards
        if config.mines >= total_cells {
            if config.mines > total_cells {
                log::warn!(
                    "Minefield already full, generated anyway, requested {} but only fits {}",
                    config.mines,
                    total_cells
                );
            }
            return Minefield::from_mask(Array2::from_elem(config.size.nd_index(), true));
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mask: Array2<bool> = Array2::default(config.size.nd_index());
        let cols = usize::from(config.size.1);
        for flat in rand::seq::index::sample(
            &mut rng,
            usize::from(total_cells),
            usize::from(config.mines),
        ) {
            mask[[flat / cols, flat % cols]] = true;
        }

        let minefield = Minefield::from_mask(mask);
        if minefield.mine_count() != config.mines {
            log::warn!(
                "Generated minefield count mismatch, actual: {}, requested: {}",
                minefield.mine_count(),
                config.mines
            );
        }
        minefield
    }
}
