//! Weighted random selection over a scenario's request templates.

use loadsmith_core::scenario::RequestTemplate;
use rand::Rng;

/// Pick a template with probability proportional to its weight.
///
/// Stateless: every call draws fresh. Callers guarantee a non-empty pool
/// whose weights passed plan validation.
pub fn select_template(templates: &[RequestTemplate]) -> &RequestTemplate {
    select_template_with(templates, &mut rand::thread_rng())
}

/// The same walk with a caller-supplied RNG, for deterministic tests.
pub fn select_template_with<'a, R: Rng + ?Sized>(
    templates: &'a [RequestTemplate],
    rng: &mut R,
) -> &'a RequestTemplate {
    let total: f64 = templates.iter().map(|t| t.weight).sum();
    let mut draw = rng.gen_range(0.0..total);
    for template in templates {
        draw -= template.weight;
        if draw <= 0.0 {
            return template;
        }
    }
    // The draw is half-open but accumulated rounding can still exhaust the
    // walk; the last template absorbs it
    &templates[templates.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool(weights: &[f64]) -> Vec<RequestTemplate> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| RequestTemplate::get(format!("https://t.test/{i}")).with_weight(*w))
            .collect()
    }

    #[test]
    fn frequencies_converge_to_weight_share() {
        let templates = pool(&[1.0, 2.0, 7.0]);
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 20_000;
        let mut counts = [0usize; 3];
        for _ in 0..draws {
            let picked = select_template_with(&templates, &mut rng);
            let index = templates.iter().position(|t| t.url == picked.url).unwrap();
            counts[index] += 1;
        }
        let share = |i: usize| counts[i] as f64 / draws as f64;
        assert!((share(0) - 0.1).abs() < 0.02, "t0 share was {}", share(0));
        assert!((share(1) - 0.2).abs() < 0.02, "t1 share was {}", share(1));
        assert!((share(2) - 0.7).abs() < 0.02, "t2 share was {}", share(2));
    }

    #[test]
    fn single_template_is_always_chosen() {
        let templates = pool(&[0.25]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(select_template_with(&templates, &mut rng).url, templates[0].url);
        }
    }

    #[test]
    fn equal_weights_split_evenly() {
        let templates = pool(&[1.0, 1.0]);
        let mut rng = StdRng::seed_from_u64(99);
        let mut first = 0usize;
        let draws = 10_000;
        for _ in 0..draws {
            if select_template_with(&templates, &mut rng).url == templates[0].url {
                first += 1;
            }
        }
        let share = first as f64 / draws as f64;
        assert!((share - 0.5).abs() < 0.03, "first share was {share}");
    }

    #[test]
    fn seeded_walks_are_reproducible() {
        let templates = pool(&[3.0, 1.0, 2.0]);
        let mut a = StdRng::seed_from_u64(1234);
        let mut b = StdRng::seed_from_u64(1234);
        for _ in 0..500 {
            assert_eq!(
                select_template_with(&templates, &mut a).url,
                select_template_with(&templates, &mut b).url
            );
        }
    }
}
