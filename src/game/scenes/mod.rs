pub mod gait_viewer;
