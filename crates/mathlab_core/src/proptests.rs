//! Property-based tests for the arithmetic and elimination engine.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::decimal::{decimal_to_fraction, fraction_to_decimal};
    use crate::elimination::{solve_augmented, EliminationSettings};
    use crate::generator::{determinant, generate_practice_system, GeneratorSettings};
    use crate::number_theory::{gcd, is_prime, lcm, prime_factors};
    use crate::rational::{reduce_fraction, Rational};

    fn non_zero_int() -> impl Strategy<Value = i64> {
        prop_oneof![(-10_000i64..=-1i64), (1i64..=10_000i64)]
    }

    proptest! {
        #[test]
        fn gcd_times_lcm_is_product(a in non_zero_int(), b in non_zero_int()) {
            prop_assert_eq!(gcd(a, b) * lcm(a, b), (a * b).abs());
        }

        #[test]
        fn gcd_divides_both(a in 0u64..100_000, b in 1u64..100_000) {
            let g = gcd(a, b);
            prop_assert!(g > 0);
            prop_assert_eq!(a % g, 0);
            prop_assert_eq!(b % g, 0);
        }

        #[test]
        fn prime_factors_multiply_back(n in 2u64..1_000_000) {
            let factors: Vec<u64> = prime_factors(n).collect();
            prop_assert!(factors.iter().all(|&p| is_prime(p)));
            prop_assert!(factors.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(factors.iter().product::<u64>(), n);
        }

        #[test]
        fn reduce_fraction_keeps_value_in_lowest_terms(n in -10_000i64..10_000, d in non_zero_int()) {
            let r = reduce_fraction(n, d).unwrap();
            prop_assert!(r.denominator() > 0);
            prop_assert_eq!(gcd(r.numerator().abs(), r.denominator()), 1);
            prop_assert_eq!(i128::from(r.numerator()) * i128::from(d), i128::from(n) * i128::from(r.denominator()));
        }

        #[test]
        fn decimal_expansion_recovers_fraction(n in -999i64..999, d in 1i64..=16) {
            let value = Rational::new(n, d).unwrap();
            let expansion = fraction_to_decimal(value, 64).unwrap();
            let derived = decimal_to_fraction(&expansion.to_string()).unwrap();
            prop_assert_eq!(derived.fraction, value);
        }

        #[test]
        fn generated_systems_reproduce_their_solution(seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let system = generate_practice_system(&mut rng, &GeneratorSettings::default()).unwrap();
            prop_assert_ne!(determinant(&system.coefficients()), 0);

            let report = solve_augmented(&system.to_rational_matrix(), &EliminationSettings::default());
            let expected: Vec<Rational> = system.solution.iter().map(|&x| Rational::from(x)).collect();
            prop_assert_eq!(report.values(), Some(expected.as_slice()));
        }

        #[test]
        fn resolving_first_snapshot_is_deterministic(seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let system = generate_practice_system(&mut rng, &GeneratorSettings::default()).unwrap();
            let settings = EliminationSettings::default();

            let first = solve_augmented(&system.to_rational_matrix(), &settings);
            let replay = solve_augmented(&first.steps[0].matrix, &settings);
            prop_assert_eq!(first, replay);
        }
    }
}
