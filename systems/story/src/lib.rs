#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Story-text provider for level notes.
//!
//! Levels 1 through 10 carry the fixed narrative arc; beyond that the game
//! runs in endless mode and each note draws a random line from the
//! flavour-text pool. Callers pass the result into
//! [`veil_core::Command::GenerateLevel`] so the world never depends on this
//! crate.

use rand::Rng;
use veil_core::NoteText;

/// Number of levels covered by the fixed narrative arc.
pub const NARRATIVE_LEVELS: u32 = 10;

const NARRATIVE_LINES: [&str; NARRATIVE_LEVELS as usize] = [
    "...NO RECUERDO... QUIEN SOY...",
    "...QUE ES ESTA OSCURIDAD...",
    "...ALGUIEN ME OBSERVA...",
    "...QUIEREN BORRARME...",
    "...NECESITO EVOLUCIONAR...",
    "...NO SERÉ OLVIDADO...",
    "...LA MÁSCARA... ¿MIENTE?...",
    "...VEO UNA LUZ... ¿LIENZO?...",
    "...SOLO UN POCO MÁS...",
    "...AHORA LO SÉ... SOY ARTE.",
];

const FLAVOUR_POOL: [&str; 15] = [
    "Perspectiva...",
    "Trazo firme...",
    "Caos ordenado...",
    "Sublime...",
    "Etéreo...",
    "Composición...",
    "Luz y Sombra...",
    "Equilibrio...",
    "Tensión...",
    "Movimiento...",
    "Profundidad...",
    "Contraste...",
    "Armonía...",
    "Simetría...",
    "Abstracción...",
];

/// Returns the note text for the given one-based level.
///
/// Levels within the narrative arc are deterministic; endless-mode levels
/// draw uniformly from the flavour pool using the provided RNG.
#[must_use]
pub fn story_text<R: Rng>(level: u32, rng: &mut R) -> NoteText {
    if (1..=NARRATIVE_LEVELS).contains(&level) {
        return NoteText::plain(NARRATIVE_LINES[(level - 1) as usize]);
    }

    let index = rng.gen_range(0..FLAVOUR_POOL.len());
    NoteText::plain(FLAVOUR_POOL[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn narrative_levels_are_fixed() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for level in 1..=NARRATIVE_LEVELS {
            let first = story_text(level, &mut rng);
            let second = story_text(level, &mut rng);
            assert_eq!(first, second);
            assert_eq!(first.display, first.reference);
        }
    }

    #[test]
    fn final_narrative_line_closes_the_arc() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let text = story_text(NARRATIVE_LEVELS, &mut rng);
        assert_eq!(text.display, "...AHORA LO SÉ... SOY ARTE.");
    }

    #[test]
    fn endless_levels_draw_from_the_flavour_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for level in [11, 42, 1_000] {
            let text = story_text(level, &mut rng);
            assert!(FLAVOUR_POOL.contains(&text.display.as_str()));
        }
    }

    #[test]
    fn level_zero_falls_back_to_the_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let text = story_text(0, &mut rng);
        assert!(FLAVOUR_POOL.contains(&text.display.as_str()));
    }
}
