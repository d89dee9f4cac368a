mod hyman;
