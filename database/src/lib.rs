pub mod consts {
    pub mod consts;
}

pub mod model {
    pub mod person;
    pub mod statement;
}

pub mod database {
    pub mod commands;
    pub mod database;
    pub mod options;
    pub mod request_manager;

    pub mod table {
        pub mod row;
        pub mod table;
    }
}

pub mod persistence;
pub mod store;
