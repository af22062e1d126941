pub mod route;
pub mod routes_list;
