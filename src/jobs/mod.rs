pub mod decision_loop;
