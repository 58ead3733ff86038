mod health;
mod submission;
