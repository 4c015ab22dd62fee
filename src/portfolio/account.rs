use crate::portfolio::position::Position;
use serde::{Deserialize, Serialize};

//one evaluated walk-forward step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    //index of the evaluated observation in the series
    pub index: usize,
    pub prediction: f64,
    pub last_value: f64,
    pub actual: f64,
    pub position: Position,
    //return before costs
    pub gross_return: f64,
    pub cost: f64,
    pub net_return: f64,
    pub equity: f64,
}

//tracks compounded equity, the held position and a step log
#[derive(Debug, Clone)]
pub struct Account {
    //baseline equity
    pub initial_equity: f64,

    //current compounded equity
    pub equity: f64,

    //position held after the last step
    pub position: Position,

    //cost rate charged per unit of turnover
    pub transaction_cost: f64,

    //total costs paid, in return units
    pub total_costs: f64,

    //complete step log
    pub step_log: Vec<StepRecord>,
}

impl Account {
    //creates a new flat account
    pub fn new(initial_equity: f64, transaction_cost: f64) -> Self {
        Account {
            initial_equity,
            equity: initial_equity,
            position: Position::flat(),
            transaction_cost,
            total_costs: 0.0,
            step_log: Vec::new(),
        }
    }

    //moves into `position` and holds it from `last_value` to `actual`
    //cost is charged on the turnover relative to the previously held position
    //a step that loses everything ruins the account, equity stays at 0 from then on
    pub fn apply_step(
        &mut self,
        index: usize,
        prediction: f64,
        last_value: f64,
        actual: f64,
        position: Position,
    ) -> &StepRecord {
        let cost = self.transaction_cost * position.turnover_from(&self.position);
        let gross_return = position.step_return(last_value, actual);
        let net_return = gross_return - cost;

        let growth = 1.0 + net_return;
        self.equity = if self.is_ruined() || growth <= 0.0 {
            0.0
        } else {
            self.equity * growth
        };
        self.total_costs += cost;
        self.position = position;

        self.step_log.push(StepRecord {
            index,
            prediction,
            last_value,
            actual,
            position,
            gross_return,
            cost,
            net_return,
            equity: self.equity,
        });

        &self.step_log[self.step_log.len() - 1]
    }

    pub fn is_ruined(&self) -> bool {
        self.equity <= 0.0
    }

    //equity values including the baseline
    pub fn equity_values(&self) -> Vec<f64> {
        std::iter::once(self.initial_equity)
            .chain(self.step_log.iter().map(|step| step.equity))
            .collect()
    }

    //number of steps where the held position changed
    pub fn num_position_changes(&self) -> usize {
        let mut previous = Position::flat();
        let mut changes = 0;
        for step in &self.step_log {
            if step.position != previous {
                changes += 1;
            }
            previous = step.position;
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::position::Direction;

    #[test]
    fn test_apply_step_compounds() {
        let mut account = Account::new(1.0, 0.0);
        account.apply_step(1, 11.0, 10.0, 11.0, Position::new(Direction::Long, 1.0));
        account.apply_step(2, 12.0, 11.0, 12.1, Position::new(Direction::Long, 1.0));
        assert!((account.equity - 1.21).abs() < 1e-12);
        assert_eq!(account.equity_values().len(), 3);
        assert_eq!(account.num_position_changes(), 1);
    }

    #[test]
    fn test_flip_costs_twice_the_rate() {
        let mut account = Account::new(1.0, 0.01);
        account.apply_step(1, 11.0, 10.0, 10.0, Position::new(Direction::Long, 1.0));
        let step = account.apply_step(2, 9.0, 10.0, 10.0, Position::new(Direction::Short, 1.0));
        assert!((step.cost - 0.02).abs() < 1e-12);
        assert!((account.total_costs - 0.03).abs() < 1e-12);
        assert_eq!(account.num_position_changes(), 2);
    }

    #[test]
    fn test_ruin_is_final() {
        let mut account = Account::new(1.0, 0.01);
        //short from 10 to 30 loses 200%
        account.apply_step(1, 9.0, 10.0, 30.0, Position::new(Direction::Short, 1.0));
        assert_eq!(account.equity, 0.0);
        assert!(account.is_ruined());

        //a winning step afterwards cannot bring equity back
        account.apply_step(2, 70.0, 30.0, 60.0, Position::new(Direction::Long, 1.0));
        assert_eq!(account.equity, 0.0);
        assert_eq!(account.equity_values(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_flat_steps_are_free() {
        let mut account = Account::new(1.0, 0.5);
        account.apply_step(1, 10.0, 10.0, 20.0, Position::flat());
        assert_eq!(account.equity, 1.0);
        assert_eq!(account.total_costs, 0.0);
        assert_eq!(account.num_position_changes(), 0);
    }
}
