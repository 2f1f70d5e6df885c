mod helpers;

mod permission_test;
