mod gantt;
mod pie;
