mod check;
mod orchestrator;
