//! Windows backend: Win32 focus probe and UI Automation tree
#![allow(unsafe_code)]

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};
use windows::Win32::Foundation::{CloseHandle, E_POINTER, FALSE, HWND, RPC_E_DISCONNECTED};
use windows::Win32::System::Com::{
    CLSCTX_INPROC_SERVER, COINIT_MULTITHREADED, CoCreateInstance, CoInitializeEx,
};
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
    QueryFullProcessImageNameW,
};
use windows::Win32::UI::Accessibility::{
    CUIAutomation8, IUIAutomation, IUIAutomation2, IUIAutomationCondition,
    IUIAutomationElement, TreeScope_Descendants, UIA_AutomationIdPropertyId,
    UIA_ControlTypePropertyId, UIA_StatusBarControlTypeId, UIA_TextControlTypeId,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetWindowTextW, GetWindowThreadProcessId,
};
use windows::core::{BSTR, HRESULT, Interface, PWSTR, VARIANT};

use crate::platform::{
    AccessError, AccessResult, AccessibilityTree, Descendants, ElementRole, FocusProbe,
    FocusedApplication,
};

/// UIA_E_ELEMENTNOTAVAILABLE: the element no longer exists in the tree
const UIA_E_ELEMENTNOTAVAILABLE: HRESULT = HRESULT(0x8004_0201_u32 as i32);

/// UIA_E_TIMEOUT: provider did not answer within the connection timeout
const UIA_E_TIMEOUT: HRESULT = HRESULT(0x8013_1505_u32 as i32);

/// UI Automation element (window root or descendant)
#[derive(Debug, Clone)]
pub struct UiaElement(IUIAutomationElement);

pub struct UiaDesktop {
    automation: IUIAutomation,
}

impl UiaDesktop {
    /// Must be called on the thread that runs the relay loop
    pub fn connect(attach_timeout: Duration) -> Result<Self> {
        let automation: IUIAutomation = unsafe {
            CoInitializeEx(None, COINIT_MULTITHREADED)
                .ok()
                .context("Failed to initialize COM")?;
            CoCreateInstance(&CUIAutomation8, None, CLSCTX_INPROC_SERVER)
                .context("Failed to create UI Automation instance")?
        };

        let timeout_ms = u32::try_from(attach_timeout.as_millis()).unwrap_or(u32::MAX);
        let automation2: IUIAutomation2 = automation
            .cast()
            .context("UI Automation 2 interface unavailable")?;
        unsafe { automation2.SetConnectionTimeout(timeout_ms) }
            .context("Failed to set UI Automation connection timeout")?;

        info!(attach_timeout_ms = timeout_ms, "UI Automation ready");
        Ok(Self { automation })
    }

    fn condition(&self, role: ElementRole, identifier: Option<&str>) -> AccessResult<IUIAutomationCondition> {
        let control_type = match role {
            ElementRole::StatusBar => UIA_StatusBarControlTypeId,
            ElementRole::Text => UIA_TextControlTypeId,
        };
        unsafe {
            let by_type = self
                .automation
                .CreatePropertyCondition(UIA_ControlTypePropertyId, &VARIANT::from(control_type.0))
                .map_err(classify)?;
            let Some(identifier) = identifier else {
                return Ok(by_type);
            };
            let by_id = self
                .automation
                .CreatePropertyCondition(UIA_AutomationIdPropertyId, &VARIANT::from(BSTR::from(identifier)))
                .map_err(classify)?;
            self.automation
                .CreateAndCondition(&by_type, &by_id)
                .map_err(classify)
        }
    }

    fn attach(&self, hwnd: HWND) -> Option<UiaElement> {
        let element = unsafe { self.automation.ElementFromHandle(hwnd) }
            .inspect_err(|e| debug!(error = %e, "UI Automation attach failed"))
            .ok()?;
        // A live element answers within the connection timeout
        unsafe { element.CurrentProcessId() }
            .inspect_err(|e| debug!(error = %e, "UI Automation element not responding"))
            .ok()?;
        Some(UiaElement(element))
    }
}

fn window_title(hwnd: HWND) -> Option<String> {
    let mut buf = [0u16; 512];
    let len = unsafe { GetWindowTextW(hwnd, &mut buf) };
    let len = usize::try_from(len).ok().filter(|&len| len > 0)?;
    Some(String::from_utf16_lossy(buf.get(..len)?))
}

fn owning_process_id(hwnd: HWND) -> Option<u32> {
    let mut pid = 0u32;
    unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid)) };
    (pid != 0).then_some(pid)
}

fn executable_name(pid: u32) -> Option<String> {
    let mut buf = [0u16; 260];
    let mut len = u32::try_from(buf.len()).ok()?;
    let path = unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, FALSE, pid)
            .inspect_err(|e| debug!(pid, error = %e, "cannot open process"))
            .ok()?;
        let queried = QueryFullProcessImageNameW(handle, PROCESS_NAME_WIN32, PWSTR(buf.as_mut_ptr()), &mut len);
        let _ = CloseHandle(handle);
        queried.ok()?;
        String::from_utf16_lossy(buf.get(..usize::try_from(len).ok()?)?)
    };
    path.rsplit('\\').next().map(str::to_string)
}

/// Stale or vanished elements are expected; everything else is not
fn classify(e: windows::core::Error) -> AccessError {
    let code = e.code();
    if code == UIA_E_ELEMENTNOTAVAILABLE || code == UIA_E_TIMEOUT || code == RPC_E_DISCONNECTED {
        AccessError::Detached(e.message())
    } else {
        AccessError::Other(anyhow!(e))
    }
}

impl FocusProbe for UiaDesktop {
    type Handle = UiaElement;

    fn focused_application(&mut self) -> Option<FocusedApplication<UiaElement>> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0.is_null() {
            return None;
        }
        let window_title = window_title(hwnd)?;
        let pid = owning_process_id(hwnd)?;
        let application_name = executable_name(pid)?;
        let handle = self.attach(hwnd)?;
        Some(FocusedApplication {
            application_name,
            handle,
            window_title,
        })
    }
}

impl AccessibilityTree for UiaDesktop {
    type Root = UiaElement;
    type Element = UiaElement;

    fn find_descendant(
        &self,
        root: &UiaElement,
        role: ElementRole,
        identifier: &str,
    ) -> AccessResult<Option<UiaElement>> {
        let condition = self.condition(role, Some(identifier))?;
        match unsafe { root.0.FindFirst(TreeScope_Descendants, &condition) } {
            Ok(element) => Ok(Some(UiaElement(element))),
            // Null result: nothing matched yet
            Err(e) if e.code().is_ok() || e.code() == E_POINTER => Ok(None),
            Err(e) => Err(classify(e)),
        }
    }

    fn descendants<'a>(
        &'a self,
        element: &'a UiaElement,
        role: ElementRole,
    ) -> AccessResult<Descendants<'a, UiaElement>> {
        let condition = self.condition(role, None)?;
        let found = unsafe { element.0.FindAll(TreeScope_Descendants, &condition) }.map_err(classify)?;
        let count = unsafe { found.Length() }.map_err(classify)?;
        Ok(Box::new((0..count).map(move |index| {
            unsafe { found.GetElement(index) }
                .map(UiaElement)
                .map_err(classify)
        })))
    }

    fn element_text(&self, element: &UiaElement) -> AccessResult<String> {
        let name = unsafe { element.0.CurrentName() }.map_err(classify)?;
        Ok(name.to_string())
    }
}
