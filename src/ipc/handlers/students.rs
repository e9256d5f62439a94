use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{
    no_store, optional_int, optional_str, required_code, required_int, required_str,
};
use crate::ipc::types::{AppState, Request};
use crate::record::{StudentPatch, StudentRecord, StudentView};
use crate::store::{Extremum, SortDirection};
use serde_json::json;

fn views<'a, I>(records: I) -> Vec<StudentView>
where
    I: IntoIterator<Item = &'a StudentRecord>,
{
    records.into_iter().map(|r| r.view()).collect()
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_store(&req.id);
    };
    ok(&req.id, json!({ "students": views(store.records()) }))
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_store(&req.id);
    };
    let code = match required_code(req, "code") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store.get(&code) {
        Ok(r) => ok(&req.id, json!({ "student": r.view() })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_store(&req.id);
    };
    let query = match required_code(req, "query") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store.search(&query) {
        Ok(hits) => ok(&req.id, json!({ "students": views(hits) })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_extremum(state: &mut AppState, req: &Request, which: Extremum) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_store(&req.id);
    };
    match store.extremum(which) {
        Ok(r) => ok(&req.id, json!({ "student": r.view() })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_sort(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return no_store(&req.id);
    };
    let direction = match required_str(req, "direction") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(direction) = SortDirection::parse(&direction) else {
        return err(
            &req.id,
            "bad_params",
            "direction must be \"asc\" or \"desc\"",
            None,
        );
    };
    match store.sort(direction) {
        Ok(()) => ok(&req.id, json!({ "students": views(store.records()) })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn parse_new_record(req: &Request) -> Result<StudentRecord, serde_json::Value> {
    Ok(StudentRecord {
        code: required_code(req, "code")?,
        name: required_str(req, "name")?,
        c1: required_int(req, "c1")?,
        c2: required_int(req, "c2")?,
        c3: required_int(req, "c3")?,
        exam: required_int(req, "exam")?,
    })
}

fn handle_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return no_store(&req.id);
    };
    let record = match parse_new_record(req) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let student = match store.add(record) {
        Ok(r) => r.view(),
        Err(e) => return store_err(&req.id, &e),
    };
    ok(&req.id, json!({ "student": student, "count": store.len() }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return no_store(&req.id);
    };
    let code = match required_code(req, "code") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match store.delete(&code) {
        Ok(removed) => ok(
            &req.id,
            json!({ "student": removed.view(), "count": store.len() }),
        ),
        Err(e) => store_err(&req.id, &e),
    }
}

fn parse_patch(req: &Request) -> Result<StudentPatch, serde_json::Value> {
    Ok(StudentPatch {
        name: optional_str(req, "name")?,
        c1: optional_int(req, "c1")?,
        c2: optional_int(req, "c2")?,
        c3: optional_int(req, "c3")?,
        exam: optional_int(req, "exam")?,
        coursework_total: optional_int(req, "courseworkTotal")?,
    })
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return no_store(&req.id);
    };
    let code = match required_code(req, "code") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch = match parse_patch(req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    match store.update(&code, &patch) {
        Ok(r) => ok(&req.id, json!({ "student": r.view() })),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_list(state, req)),
        "students.get" => Some(handle_get(state, req)),
        "students.search" => Some(handle_search(state, req)),
        "students.highest" => Some(handle_extremum(state, req, Extremum::Highest)),
        "students.lowest" => Some(handle_extremum(state, req, Extremum::Lowest)),
        "students.sort" => Some(handle_sort(state, req)),
        "students.add" => Some(handle_add(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        "students.update" => Some(handle_update(state, req)),
        _ => None,
    }
}
