//! Boolean composition of termination conditions

use std::fmt;

use crate::termination::{EngineState, TerminationCondition};

/// How a composite combines its conditions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositeOperator {
    /// Terminate when any condition is satisfied (OR)
    #[default]
    Any,
    /// Terminate when every condition is satisfied (AND)
    All,
}

/// A list of conditions combined with AND or OR
///
/// An empty composite never terminates. Evaluation short-circuits, so
/// stateful conditions after the deciding one are not updated that
/// generation.
#[derive(Default)]
pub struct CompositeTermination {
    conditions: Vec<Box<dyn TerminationCondition>>,
    operator: CompositeOperator,
    fired: Option<&'static str>,
}

impl CompositeTermination {
    /// Create a composite from a list of conditions
    pub fn new(
        operator: CompositeOperator,
        conditions: Vec<Box<dyn TerminationCondition>>,
    ) -> Self {
        Self {
            conditions,
            operator,
            fired: None,
        }
    }

    /// OR composite
    pub fn any(conditions: Vec<Box<dyn TerminationCondition>>) -> Self {
        Self::new(CompositeOperator::Any, conditions)
    }

    /// AND composite
    pub fn all(conditions: Vec<Box<dyn TerminationCondition>>) -> Self {
        Self::new(CompositeOperator::All, conditions)
    }

    /// Append a condition
    pub fn add_condition<C>(&mut self, condition: C)
    where
        C: TerminationCondition + 'static,
    {
        self.conditions.push(Box::new(condition));
    }

    /// Builder-style [`CompositeTermination::add_condition`]
    pub fn with_condition<C>(mut self, condition: C) -> Self
    where
        C: TerminationCondition + 'static,
    {
        self.add_condition(condition);
        self
    }

    /// Remove the condition at `index`; out-of-range indices are ignored
    pub fn remove_condition(&mut self, index: usize) -> Option<Box<dyn TerminationCondition>> {
        (index < self.conditions.len()).then(|| self.conditions.remove(index))
    }

    /// Change how conditions are combined
    pub fn set_operator(&mut self, operator: CompositeOperator) {
        self.operator = operator;
    }

    /// Current combination operator
    pub fn operator(&self) -> CompositeOperator {
        self.operator
    }

    /// Number of conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether the composite has no conditions
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl fmt::Debug for CompositeTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeTermination")
            .field("operator", &self.operator)
            .field(
                "conditions",
                &self.conditions.iter().map(|c| c.reason()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl TerminationCondition for CompositeTermination {
    fn should_terminate(&mut self, state: &EngineState<'_>) -> bool {
        self.fired = None;
        if self.conditions.is_empty() {
            return false;
        }

        match self.operator {
            CompositeOperator::Any => {
                for condition in &mut self.conditions {
                    if condition.should_terminate(state) {
                        self.fired = Some(condition.reason());
                        return true;
                    }
                }
                false
            }
            CompositeOperator::All => {
                for condition in &mut self.conditions {
                    if !condition.should_terminate(state) {
                        return false;
                    }
                }
                true
            }
        }
    }

    /// For an OR composite, the reason of the condition that fired
    fn reason(&self) -> &'static str {
        match (self.fired, self.operator) {
            (Some(reason), _) => reason,
            (None, CompositeOperator::Any) => "One of multiple conditions met",
            (None, CompositeOperator::All) => "All conditions met",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::termination::test_support::*;
    use crate::termination::{FitnessStagnation, FitnessThreshold, GenerationCount};

    struct Counting {
        result: bool,
        calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    impl TerminationCondition for Counting {
        fn should_terminate(&mut self, _state: &EngineState<'_>) -> bool {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.result
        }

        fn reason(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn test_empty_composite_never_terminates() {
        let population = population_with(100.0, 0.0);
        let history = history_of(&[100.0; 10]);
        assert!(!CompositeTermination::any(vec![]).should_terminate(&state(&population, &history)));
        assert!(!CompositeTermination::all(vec![]).should_terminate(&state(&population, &history)));
    }

    #[test]
    fn test_any_of() {
        let mut composite = CompositeTermination::any(vec![
            Box::new(GenerationCount::new(5)),
            Box::new(FitnessThreshold::new(10.0)),
        ]);

        let low = population_with(1.0, 0.0);
        let high = population_with(10.0, 0.0);
        let short = history_of(&[0.0; 2]);
        let long = history_of(&[0.0; 5]);

        assert!(!composite.should_terminate(&state(&low, &short)));
        assert!(composite.should_terminate(&state(&low, &long)));
        assert_eq!(composite.reason(), "Maximum generations reached");
        assert!(composite.should_terminate(&state(&high, &short)));
        assert_eq!(composite.reason(), "Fitness threshold reached");
    }

    #[test]
    fn test_all_of() {
        let mut composite = CompositeTermination::all(vec![
            Box::new(GenerationCount::new(5)),
            Box::new(FitnessThreshold::new(10.0)),
        ]);

        let low = population_with(1.0, 0.0);
        let high = population_with(10.0, 0.0);
        let short = history_of(&[0.0; 2]);
        let long = history_of(&[0.0; 5]);

        assert!(!composite.should_terminate(&state(&low, &short)));
        assert!(!composite.should_terminate(&state(&low, &long)));
        assert!(!composite.should_terminate(&state(&high, &short)));
        assert!(composite.should_terminate(&state(&high, &long)));
        assert_eq!(composite.reason(), "All conditions met");
    }

    #[test]
    fn test_short_circuit() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let population = population_with(1.0, 0.0);
        let history = history_of(&[0.0]);
        let calls = Arc::new(AtomicUsize::new(0));
        let counting = |result| Counting {
            result,
            calls: Arc::clone(&calls),
        };

        let mut or = CompositeTermination::any(vec![
            Box::new(counting(true)),
            Box::new(counting(true)),
        ]);
        assert!(or.should_terminate(&state(&population, &history)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        calls.store(0, Ordering::SeqCst);
        let mut and = CompositeTermination::all(vec![
            Box::new(counting(false)),
            Box::new(counting(true)),
        ]);
        assert!(!and.should_terminate(&state(&population, &history)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mutators() {
        let mut composite = CompositeTermination::default()
            .with_condition(GenerationCount::new(3))
            .with_condition(FitnessStagnation::new(2));
        assert_eq!(composite.len(), 2);
        assert_eq!(composite.operator(), CompositeOperator::Any);

        assert!(composite.remove_condition(7).is_none());
        assert_eq!(composite.len(), 2);
        assert!(composite.remove_condition(0).is_some());
        assert_eq!(composite.len(), 1);

        composite.set_operator(CompositeOperator::All);
        assert_eq!(composite.operator(), CompositeOperator::All);

        composite.add_condition(FitnessThreshold::new(1.0));
        assert_eq!(composite.len(), 2);
        assert!(!composite.is_empty());
    }

    #[test]
    fn test_nested_composites() {
        let population = population_with(10.0, 0.0);
        let history = history_of(&[0.0; 2]);
        let inner = CompositeTermination::all(vec![
            Box::new(FitnessThreshold::new(5.0)),
            Box::new(GenerationCount::new(2)),
        ]);
        let mut outer = CompositeTermination::any(vec![
            Box::new(GenerationCount::new(100)),
            Box::new(inner),
        ]);
        assert!(outer.should_terminate(&state(&population, &history)));
    }
}
